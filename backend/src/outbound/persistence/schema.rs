//! Diesel table definitions; must match `backend/migrations`.

diesel::table! {
    /// One row per article document.
    articles (name) {
        /// Unique article key.
        name -> Text,
        /// Upvote counter; always `cardinality(upvoted_ids)`.
        upvotes -> Int8,
        /// Subjects that have upvoted, in voting order.
        upvoted_ids -> Array<Text>,
        /// Comment thread as a JSON array of `{postedBy, text}` objects.
        comments -> Jsonb,
    }
}

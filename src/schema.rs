table! {
    comment (id) {
        id -> Integer,
        title -> Text,
        description -> Text,
        post -> Integer,
    }
}

table! {
    post (id) {
        id -> Integer,
        timestamp -> Nullable<Timestamp>,
        user -> Text,
        title -> Text,
        text -> Text,
        sub -> Nullable<Integer>,
    }
}

table! {
    sub (id) {
        id -> Integer,
        name -> Text,
        description -> Text,
    }
}

joinable!(comment -> post (post));

allow_tables_to_appear_in_same_query!(comment, post, sub,);

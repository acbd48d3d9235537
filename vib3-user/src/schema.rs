diesel::table! {
    users (id) {
        id -> Uuid,
        #[max_length = 255]
        email -> Varchar,
        password_hash -> Text,
        #[max_length = 100]
        name -> Varchar,
        age -> Nullable<Int4>,
        #[max_length = 20]
        gender -> Nullable<Varchar>,
        #[max_length = 500]
        bio -> Varchar,
        interests -> Array<Text>,
        longitude -> Nullable<Float8>,
        latitude -> Nullable<Float8>,
        #[max_length = 100]
        city -> Nullable<Varchar>,
        #[max_length = 100]
        country -> Nullable<Varchar>,
        preferred_genders -> Array<Text>,
        age_min -> Int4,
        age_max -> Int4,
        max_distance_km -> Int4,
        profile_complete -> Bool,
        is_active -> Bool,
        last_active_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    user_photos (id) {
        id -> Uuid,
        user_id -> Uuid,
        url -> Text,
        storage_key -> Text,
        position -> Int4,
        created_at -> Timestamptz,
    }
}

// Touched only when an account is deleted.
diesel::table! {
    chats (id) {
        id -> Uuid,
        #[max_length = 10]
        chat_type -> Varchar,
        #[max_length = 80]
        direct_key -> Nullable<Varchar>,
        is_deleted -> Bool,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    chat_participants (chat_id, user_id) {
        chat_id -> Uuid,
        user_id -> Uuid,
    }
}

diesel::joinable!(user_photos -> users (user_id));
diesel::joinable!(chat_participants -> chats (chat_id));

diesel::allow_tables_to_appear_in_same_query!(users, user_photos, chats, chat_participants);

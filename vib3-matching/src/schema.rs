diesel::table! {
    matches (id) {
        id -> Uuid,
        user_low -> Uuid,
        user_high -> Uuid,
        matched -> Bool,
        matched_at -> Nullable<Timestamptz>,
        last_message_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    swipes (id) {
        id -> Uuid,
        match_id -> Uuid,
        user_id -> Uuid,
        target_id -> Uuid,
        liked -> Bool,
        created_at -> Timestamptz,
    }
}

// Read-only view of the identity store.
diesel::table! {
    users (id) {
        id -> Uuid,
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
    }
}

diesel::table! {
    user_photos (id) {
        id -> Uuid,
        user_id -> Uuid,
        url -> Text,
        position -> Int4,
    }
}

diesel::joinable!(swipes -> matches (match_id));
diesel::joinable!(user_photos -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(matches, swipes, users, user_photos);

diesel::table! {
    puzzles (id) {
        id -> Integer,
        puzzle_date -> Date,
        slot -> Integer,
        kind -> Text,
        variant -> Text,
        target_word -> Text,
        display_word -> Text,
        letter_menus -> Text,
        start_indices -> Text,
        theme_hint -> Text,
        metadata -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    attempts (id) {
        id -> Integer,
        user_id -> Text,
        puzzle_id -> Integer,
        mode -> Text,
        started_at -> Timestamp,
        completed_at -> Nullable<Timestamp>,
        solve_time_ms -> Nullable<BigInt>,
        penalty_ms -> BigInt,
        final_time_ms -> Nullable<BigInt>,
        hints_used -> Text,
        is_completed -> Bool,
        gave_up -> Bool,
        version -> Integer,
    }
}

diesel::joinable!(attempts -> puzzles (puzzle_id));

diesel::allow_tables_to_appear_in_same_query!(attempts, puzzles,);

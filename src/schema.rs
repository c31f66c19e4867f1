diesel::table! {
    times (id) {
        id -> Int4,
        time_start -> Time,
        date_start -> Date,
        time_end -> Timestamptz,
    }
}

diesel::table! {
    appointments (id) {
        id -> Int4,
        times_id -> Int4,
        filled -> Bool,
        client -> Varchar,
    }
}

diesel::joinable!(appointments -> times (times_id));
diesel::allow_tables_to_appear_in_same_query!(appointments, times);

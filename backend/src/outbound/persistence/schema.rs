//! Diesel table definitions. These must match `migrations/` exactly.

diesel::table! {
    /// Staff accounts.
    users (id) {
        id -> Int8,
        first_name -> Varchar,
        last_name -> Varchar,
        login -> Varchar,
        password_hash -> Text,
        password_salt -> Text,
        role -> Varchar,
        position -> Varchar,
        telephone -> Varchar,
    }
}

diesel::table! {
    /// Key catalog with the persisted custody flag.
    keys (bs_id) {
        bs_id -> Varchar,
        bs_name -> Varchar,
        bs_address -> Varchar,
        /// True while an open loan exists for the key.
        borrow -> Bool,
    }
}

diesel::table! {
    /// Append-only loan ledger. `return_date IS NULL` marks an open loan.
    borrow (id) {
        id -> Int8,
        bs_id -> Varchar,
        bs_name -> Varchar,
        /// Borrower full name snapshot.
        fio -> Varchar,
        borrow_date -> Timestamptz,
        return_date -> Nullable<Timestamptz>,
        /// Loan reason.
        prichina -> Varchar,
        /// Receiver full name snapshot.
        fio_receiver -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Phone numbers notified on custody changes.
    telnumber (id) {
        id -> Int8,
        tel_number -> Varchar,
    }
}

diesel::allow_tables_to_appear_in_same_query!(users, keys, borrow, telnumber);

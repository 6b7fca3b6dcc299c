//! Internal Diesel row structs.
//!
//! Rows never leave the persistence layer; adapters convert them into domain
//! types at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    CustodyValidationError, KeyId, KeyRecord, LoanRecord, PersonName, Recipient, StaffProfile,
    StoredPassword, UserAccount, UserId, UserValidationError,
};

use super::schema::{borrow, keys, telnumber, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub login: String,
    pub password_hash: String,
    pub password_salt: String,
    pub role: String,
    pub position: String,
    pub telephone: String,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = UserValidationError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            name: PersonName::new(&row.first_name, &row.last_name)?,
            login: row.login,
            password: StoredPassword {
                hash: row.password_hash,
                salt: row.password_salt,
            },
            role: row.role.parse()?,
            profile: StaffProfile::new(&row.position, &row.telephone)?,
        })
    }
}

/// Insertable account row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub login: &'a str,
    pub password_hash: &'a str,
    pub password_salt: &'a str,
    pub role: &'a str,
    pub position: &'a str,
    pub telephone: &'a str,
}

/// Row read from `keys`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = keys)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct KeyRow {
    pub bs_id: String,
    pub bs_name: String,
    pub bs_address: String,
    pub borrow: bool,
}

impl TryFrom<KeyRow> for KeyRecord {
    type Error = CustodyValidationError;

    fn try_from(row: KeyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: KeyId::parse(&row.bs_id)?,
            name: row.bs_name,
            address: row.bs_address,
            borrowed: row.borrow,
        })
    }
}

/// Row read from `borrow`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = borrow)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LoanRow {
    pub id: i64,
    pub bs_id: String,
    pub bs_name: String,
    pub fio: String,
    pub borrow_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub prichina: String,
    pub fio_receiver: Option<String>,
}

impl TryFrom<LoanRow> for LoanRecord {
    type Error = CustodyValidationError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            key_id: KeyId::parse(&row.bs_id)?,
            key_name: row.bs_name,
            borrower: row.fio,
            borrowed_at: row.borrow_date,
            returned_at: row.return_date,
            reason: row.prichina,
            receiver: row.fio_receiver,
        })
    }
}

/// Insertable open loan.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = borrow)]
pub(crate) struct NewLoanRow<'a> {
    pub bs_id: &'a str,
    pub bs_name: &'a str,
    pub fio: &'a str,
    pub borrow_date: DateTime<Utc>,
    pub prichina: &'a str,
}

/// Row read from `telnumber`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = telnumber)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RecipientRow {
    pub id: i64,
    pub tel_number: String,
}

impl From<RecipientRow> for Recipient {
    fn from(row: RecipientRow) -> Self {
        Self {
            id: row.id,
            phone: row.tel_number,
        }
    }
}

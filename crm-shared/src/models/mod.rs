/// Database models for the CRM
///
/// Each module owns one table (plus its link tables) and exposes async CRUD
/// functions taking a `PgPool`. Functions named `*_owned` filter by the owning
/// user's id; a row owned by someone else is reported as missing.
///
/// # Models
///
/// - `user`: accounts, roles and password hashes
/// - `customer`: customer records with status
/// - `tag`: global tags and customer links
/// - `note`: notes on customers
/// - `problem`: problems tracker and its statistics
pub mod customer;
pub mod note;
pub mod problem;
pub mod tag;
pub mod user;

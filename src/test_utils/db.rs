use rusqlite::Connection;

use crate::{
    auth::{PasswordHash, UserID, set_user_password},
    db::initialize,
};

// Never verified. Tests that log in hash their own password.
const TEST_PASSWORD_HASH: &str = "not-a-real-hash";

/// An initialized in-memory database with user 1 already created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("could not open in-memory database");
    initialize(&connection).expect("could not initialize database");
    set_user_password(
        UserID::new(1),
        PasswordHash::new_unchecked(TEST_PASSWORD_HASH),
        &connection,
    )
    .expect("could not create test user");

    connection
}

/// Create user 2 for checking that records are scoped by owner.
pub(crate) fn insert_second_user(connection: &Connection) -> UserID {
    let user_id = UserID::new(2);
    set_user_password(
        user_id,
        PasswordHash::new_unchecked(TEST_PASSWORD_HASH),
        connection,
    )
    .expect("could not create second test user");

    user_id
}

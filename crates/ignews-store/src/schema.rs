//! PostgreSQL schema definitions.
//!
//! Statements are idempotent so `PgStore::migrate` can run on every start.

/// Creates the customer link table.
pub const CREATE_CUSTOMERS: &str = "CREATE TABLE IF NOT EXISTS stripe_customers (
    customer_id TEXT PRIMARY KEY,
    user_id     UUID NOT NULL
)";

/// Creates the subscription table.
pub const CREATE_SUBSCRIPTIONS: &str = "CREATE TABLE IF NOT EXISTS subscriptions (
    id          TEXT PRIMARY KEY,
    user_id     UUID NOT NULL,
    customer_id TEXT NOT NULL,
    status      TEXT,
    price_id    TEXT,
    updated_at  TIMESTAMPTZ NOT NULL
)";

/// Index: subscriptions by user.
pub const CREATE_SUBSCRIPTIONS_BY_USER: &str =
    "CREATE INDEX IF NOT EXISTS subscriptions_by_user ON subscriptions (user_id, updated_at DESC)";

/// Returns all schema statements in execution order.
#[must_use]
pub fn all_statements() -> Vec<&'static str> {
    vec![
        CREATE_CUSTOMERS,
        CREATE_SUBSCRIPTIONS,
        CREATE_SUBSCRIPTIONS_BY_USER,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_idempotent() {
        for stmt in all_statements() {
            assert!(stmt.contains("IF NOT EXISTS"), "{stmt}");
        }
    }
}

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_users;
mod m20261001_000002_catalog;
mod m20261001_000003_profiles;
mod m20261001_000004_orders;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_users::Migration),
            Box::new(m20261001_000002_catalog::Migration),
            Box::new(m20261001_000003_profiles::Migration),
            Box::new(m20261001_000004_orders::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectionTrait, Database, Statement};

    async fn table_count(db: &sea_orm::DatabaseConnection) -> i64 {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name <> 'seaql_migrations'",
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get::<i64>("", "n").unwrap()
    }

    #[tokio::test]
    async fn migrations_apply_and_roll_back() {
        let db = Database::connect("sqlite::memory:").await.unwrap();

        Migrator::up(&db, None).await.unwrap();
        // users, auth_tokens, seven catalog tables, three profiles, three order tables
        assert_eq!(table_count(&db).await, 15);

        Migrator::down(&db, None).await.unwrap();
        assert_eq!(table_count(&db).await, 0);
    }
}

pub use sea_orm_migration::prelude::*;

mod m20260104_000001_initial;
mod m20260118_000001_add_purchase_plans;
mod m20260203_000001_add_calendar;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260104_000001_initial::Migration),
            Box::new(m20260118_000001_add_purchase_plans::Migration),
            Box::new(m20260203_000001_add_calendar::Migration),
        ]
    }
}

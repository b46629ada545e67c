use sqlx::migrate::Migrator;

#[tokio::test]
async fn migration_files_parse() -> anyhow::Result<()> {
    let migrator = Migrator::new(std::path::Path::new("migrations")).await?;

    assert!(migrator.iter().next().is_some(), "expected at least one migration");
    assert!(
        migrator.iter().any(|migration| migration.description.contains("init")),
        "expected the init migration to be present"
    );

    Ok(())
}

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;

use crate::player::{PlayerProfile, PlayerStats};

/// Infrastructure-level storage failure. Policy rejections never take this
/// path; only genuinely unexpected errors do, and the HTTP layer maps them
/// to a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        // Run migrations
        Self::migrate(&pool).await?;

        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS players (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                x REAL DEFAULT 0.0,
                y REAL DEFAULT 0.0,
                hp INTEGER DEFAULT 100,
                max_hp INTEGER DEFAULT 100,
                atk INTEGER DEFAULT 10,
                def INTEGER DEFAULT 2,
                xp INTEGER DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                last_seen DATETIME DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;

        tracing::info!("Database migrations complete");
        Ok(())
    }

    pub async fn load_player(&self, id: &str) -> Result<Option<PlayerProfile>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, name, x, y, hp, max_hp, atk, def, xp FROM players WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| PlayerProfile {
            id: r.get("id"),
            name: r.get("name"),
            x: r.get("x"),
            y: r.get("y"),
            stats: PlayerStats {
                hp: r.get("hp"),
                max_hp: r.get("max_hp"),
                atk: r.get("atk"),
                def: r.get("def"),
                xp: r.get("xp"),
            },
        }))
    }

    pub async fn save_player(&self, profile: &PlayerProfile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"INSERT INTO players (id, name, x, y, hp, max_hp, atk, def, xp)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                x = excluded.x, y = excluded.y,
                hp = excluded.hp, max_hp = excluded.max_hp,
                atk = excluded.atk, def = excluded.def, xp = excluded.xp,
                last_seen = CURRENT_TIMESTAMP"#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(profile.x)
        .bind(profile.y)
        .bind(profile.stats.hp)
        .bind(profile.stats.max_hp)
        .bind(profile.stats.atk)
        .bind(profile.stats.def)
        .bind(profile.stats.xp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

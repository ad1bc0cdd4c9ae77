use anyhow::{anyhow, bail, Result};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    models::{Category, CategoryInput},
};

fn row_to_category(row: &Row) -> Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        name: row.get("name")?,
        color_hex: row.get("color_hex")?,
    })
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl Database {
    /// All categories, ordered by id
    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, color_hex FROM categories ORDER BY id ASC")?;

            let mut rows = stmt.query([])?;
            let mut categories = Vec::new();
            while let Some(row) = rows.next()? {
                categories.push(row_to_category(row)?);
            }

            Ok(categories)
        })
        .await
    }

    pub async fn get_category(&self, category_id: i64) -> Result<Option<Category>> {
        self.execute(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, color_hex FROM categories WHERE id = ?1")?;
            let mut rows = stmt.query(params![category_id])?;
            let category = match rows.next()? {
                Some(row) => Some(row_to_category(row)?),
                None => None,
            };
            Ok(category)
        })
        .await
    }

    /// Create a category. Colors must be `#RRGGBB`.
    pub async fn insert_category(&self, input: CategoryInput) -> Result<Category> {
        self.execute(move |conn| {
            let name = input.name.trim().to_string();
            if name.is_empty() {
                bail!("Category name must not be empty");
            }
            if !is_hex_color(&input.color_hex) {
                bail!("Invalid category color '{}'", input.color_hex);
            }

            conn.execute(
                "INSERT INTO categories (name, color_hex) VALUES (?1, ?2)",
                params![name, input.color_hex],
            )?;

            let category_id = conn.last_insert_rowid();

            let mut stmt =
                conn.prepare("SELECT id, name, color_hex FROM categories WHERE id = ?1")?;
            let mut rows = stmt.query(params![category_id])?;
            let category = match rows.next()? {
                Some(row) => row_to_category(row)?,
                None => return Err(anyhow!("Category not found after insert")),
            };

            Ok(category)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[tokio::test]
    async fn seeded_categories_are_present() {
        let db = Database::new(PathBuf::from(":memory:")).unwrap();
        let categories = db.get_categories().await.unwrap();
        assert_eq!(categories.len(), 5);
        assert_eq!(categories[2].name, "Yoga");
        assert_eq!(categories[4].color_hex, "#E6B200");
    }

    #[tokio::test]
    async fn insert_validates_input() {
        let db = Database::new(PathBuf::from(":memory:")).unwrap();
        let created = db
            .insert_category(CategoryInput {
                name: " Climbing ".into(),
                color_hex: "#1ABC9C".into(),
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Climbing");
        assert_eq!(db.get_category(created.id).await.unwrap(), Some(created));

        let bad_color = db
            .insert_category(CategoryInput {
                name: "Boxing".into(),
                color_hex: "red".into(),
            })
            .await;
        assert!(bad_color.is_err());
    }
}

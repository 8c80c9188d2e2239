use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::{
    ComplianceRule, RestrictedCountry, RestrictedItem, RuleDraft, Severity,
};

use super::traits::{match_products, DocumentRecord, ResearchRecord, RuleStore};

/// PostgreSQL implementation of the RuleStore trait.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgresStore with a connection pool.
    pub async fn connect(
        database_url: &str,
        min_connections: u32,
        max_connections: u32,
    ) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(min_connections)
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const RULE_COLUMNS: &str = "id, rule_name, rule_type, product_name, rule_conditions, \
     description, source_link, last_verified, is_active";

const ITEM_COLUMNS: &str = "id, item_name, severity, category, description, requirements, \
     source_link, effective_date";

fn rule_from_row(row: &PgRow) -> anyhow::Result<ComplianceRule> {
    let draft = RuleDraft {
        rule_name: row.try_get("rule_name")?,
        rule_type: row.try_get("rule_type")?,
        product_name: row.try_get("product_name")?,
        rule_conditions: row
            .try_get::<Option<serde_json::Value>, _>("rule_conditions")?
            .unwrap_or_default(),
        description: row.try_get("description")?,
        source_link: row.try_get("source_link")?,
        last_verified: row.try_get("last_verified")?,
        is_active: row.try_get("is_active")?,
    };

    Ok(ComplianceRule::from_draft(row.try_get("id")?, draft))
}

fn item_from_row(row: &PgRow) -> anyhow::Result<RestrictedItem> {
    let severity: String = row.try_get("severity")?;

    Ok(RestrictedItem {
        id: row.try_get("id")?,
        item_name: row.try_get::<Option<String>, _>("item_name")?.unwrap_or_default(),
        severity: Severity::parse_lenient(&severity),
        category: row.try_get::<Option<String>, _>("category")?.unwrap_or_default(),
        description: row.try_get::<Option<String>, _>("description")?.unwrap_or_default(),
        requirements: row.try_get("requirements")?,
        source_link: row.try_get("source_link")?,
        effective_date: row.try_get("effective_date")?,
    })
}

fn country_from_row(row: &PgRow) -> anyhow::Result<RestrictedCountry> {
    Ok(RestrictedCountry {
        id: row.try_get("id")?,
        country_code: row.try_get::<Option<String>, _>("country_code")?.unwrap_or_default(),
        country_name: row.try_get::<Option<String>, _>("country_name")?.unwrap_or_default(),
        restriction_level: row
            .try_get::<Option<String>, _>("restriction_level")?
            .unwrap_or_default(),
        restriction_reason: row.try_get("restriction_reason")?,
    })
}

#[async_trait]
impl RuleStore for PostgresStore {
    async fn active_rules(&self) -> anyhow::Result<Vec<ComplianceRule>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM compliance_rules WHERE is_active = true ORDER BY created_at, id",
            RULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(rule_from_row).collect()
    }

    async fn restricted_countries(&self) -> anyhow::Result<Vec<RestrictedCountry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, country_code, country_name, restriction_level, restriction_reason
            FROM restricted_countries
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(country_from_row).collect()
    }

    async fn restricted_items(&self) -> anyhow::Result<Vec<RestrictedItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM restricted_items ORDER BY created_at, id",
            ITEM_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(item_from_row).collect()
    }

    async fn find_restricted_items(&self, products: &[String]) -> anyhow::Result<Vec<RestrictedItem>> {
        let patterns: Vec<String> = products
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| format!("%{}%", p))
            .collect();

        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM restricted_items WHERE item_name ILIKE ANY($1) ORDER BY created_at, id",
            ITEM_COLUMNS
        ))
        .bind(&patterns)
        .fetch_all(&self.pool)
        .await?;

        let items = rows.iter().map(item_from_row).collect::<anyhow::Result<Vec<_>>>()?;

        // ILIKE treats % and _ in product names as wildcards; re-check literally.
        Ok(match_products(items, products))
    }

    async fn list_rules(&self) -> anyhow::Result<Vec<ComplianceRule>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM compliance_rules ORDER BY created_at, id",
            RULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(rule_from_row).collect()
    }

    async fn create_rule(&self, draft: RuleDraft) -> anyhow::Result<ComplianceRule> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO compliance_rules (
                rule_name, rule_type, product_name, rule_conditions,
                description, source_link, last_verified, is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            RULE_COLUMNS
        ))
        .bind(&draft.rule_name)
        .bind(&draft.rule_type)
        .bind(&draft.product_name)
        .bind(&draft.rule_conditions)
        .bind(&draft.description)
        .bind(&draft.source_link)
        .bind(&draft.last_verified)
        .bind(draft.is_active)
        .fetch_one(&self.pool)
        .await?;

        rule_from_row(&row)
    }

    async fn update_rule(&self, id: Uuid, draft: RuleDraft) -> anyhow::Result<Option<ComplianceRule>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE compliance_rules
            SET rule_name = $2,
                rule_type = $3,
                product_name = $4,
                rule_conditions = $5,
                description = $6,
                source_link = $7,
                last_verified = $8,
                is_active = $9,
                updated_at = now()
            WHERE id = $1
            RETURNING {}
            "#,
            RULE_COLUMNS
        ))
        .bind(id)
        .bind(&draft.rule_name)
        .bind(&draft.rule_type)
        .bind(&draft.product_name)
        .bind(&draft.rule_conditions)
        .bind(&draft.description)
        .bind(&draft.source_link)
        .bind(&draft.last_verified)
        .bind(draft.is_active)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(rule_from_row).transpose()
    }

    async fn delete_rule(&self, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM compliance_rules WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_restricted_item(&self, item: RestrictedItem) -> anyhow::Result<RestrictedItem> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO restricted_items (
                id, item_name, severity, category, description,
                requirements, source_link, effective_date
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(item.id)
        .bind(&item.item_name)
        .bind(item.severity.as_str())
        .bind(&item.category)
        .bind(&item.description)
        .bind(&item.requirements)
        .bind(&item.source_link)
        .bind(&item.effective_date)
        .fetch_one(&self.pool)
        .await?;

        item_from_row(&row)
    }

    async fn create_restricted_country(
        &self,
        country: RestrictedCountry,
    ) -> anyhow::Result<RestrictedCountry> {
        let row = sqlx::query(
            r#"
            INSERT INTO restricted_countries (
                id, country_code, country_name, restriction_level, restriction_reason
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, country_code, country_name, restriction_level, restriction_reason
            "#,
        )
        .bind(country.id)
        .bind(&country.country_code)
        .bind(&country.country_name)
        .bind(&country.restriction_level)
        .bind(&country.restriction_reason)
        .fetch_one(&self.pool)
        .await?;

        country_from_row(&row)
    }

    async fn record_document(&self, record: &DocumentRecord) -> anyhow::Result<Uuid> {
        let products = serde_json::to_value(&record.products)?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO compliance_documents (
                document_type,
                products,
                from_country,
                to_country,
                restrictions_applied,
                document_content,
                generated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&record.document_type)
        .bind(products)
        .bind(&record.from_country)
        .bind(&record.to_country)
        .bind(&record.restrictions_applied)
        .bind(&record.document_content)
        .bind(record.generated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn cache_research(&self, record: &ResearchRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO research_cache (query, results, timestamp)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.query)
        .bind(&record.results)
        .bind(record.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// src/export/database.rs
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::edgar::FilingRecord;
use crate::metrics::schema::NOT_FOUND;
use crate::metrics::MetricPayload;
use crate::utils::error::ExportError;

/// Relational sink. One row per (ticker, filing date, filing type) in the
/// company-level tables, one row per (ticker, filing date, filing type,
/// basin) in the basin table; re-ingestion updates in place.
pub struct MetricsDb {
    pool: SqlitePool,
}

const TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS company_summary (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        cik TEXT,
        company_name TEXT,
        filing_type TEXT,
        filing_date TEXT,
        time_period TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, filing_date, filing_type)
    )",
    "CREATE TABLE IF NOT EXISTS production_data (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        company_name TEXT,
        filing_type TEXT,
        filing_date TEXT,
        time_period TEXT,
        quarter TEXT,
        year TEXT,
        oil_mbbl_per_day TEXT,
        ngl_mbbl_per_day TEXT,
        gas_mmcf_per_day TEXT,
        boe_mboe_per_day TEXT,
        oil_mmbls_total TEXT,
        ngl_mmbls_total TEXT,
        gas_bcf_total TEXT,
        boe_mmboe_total TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, filing_date, filing_type)
    )",
    "CREATE TABLE IF NOT EXISTS activity_wells (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        company_name TEXT,
        filing_type TEXT,
        filing_date TEXT,
        quarter TEXT,
        year TEXT,
        drilling_rigs TEXT,
        gross_wells_drilled TEXT,
        gross_wells_completed TEXT,
        gross_wells_til TEXT,
        net_wells_til TEXT,
        avg_lateral_length_drilled TEXT,
        avg_lateral_length_completed TEXT,
        working_interest_percent TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, filing_date, filing_type)
    )",
    "CREATE TABLE IF NOT EXISTS revenue_data (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        company_name TEXT,
        filing_type TEXT,
        filing_date TEXT,
        quarter TEXT,
        year TEXT,
        oil_revenue TEXT,
        ngl_revenue TEXT,
        gas_revenue TEXT,
        total_revenue TEXT,
        revenue_per_boe TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, filing_date, filing_type)
    )",
    "CREATE TABLE IF NOT EXISTS realized_prices (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        company_name TEXT,
        filing_type TEXT,
        filing_date TEXT,
        quarter TEXT,
        year TEXT,
        oil_price TEXT,
        ngl_price TEXT,
        gas_price TEXT,
        boe_price TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, filing_date, filing_type)
    )",
    "CREATE TABLE IF NOT EXISTS cost_data (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        company_name TEXT,
        filing_type TEXT,
        filing_date TEXT,
        quarter TEXT,
        year TEXT,
        production_cost_per_boe TEXT,
        lease_operating_expense_per_boe TEXT,
        transportation_cost_per_boe TEXT,
        production_taxes_per_boe TEXT,
        development_capex TEXT,
        exploration_capex TEXT,
        total_capex TEXT,
        ddna_per_boe TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, filing_date, filing_type)
    )",
    "CREATE TABLE IF NOT EXISTS basin_data (
        id INTEGER PRIMARY KEY,
        ticker TEXT NOT NULL,
        company_name TEXT,
        sec_filing_date TEXT,
        file_type TEXT,
        basin_name TEXT,
        gas_reserves TEXT,
        gas_per_day TEXT,
        oil_reserves TEXT,
        oil_per_day TEXT,
        ngl_reserves TEXT,
        ngl_per_day TEXT,
        total_boe TEXT,
        boe_per_day TEXT,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        UNIQUE(ticker, sec_filing_date, file_type, basin_name)
    )",
];

/// The sentinel is stored as SQL NULL, not as a literal string.
fn clean_val(value: &str) -> Option<&str> {
    if value.is_empty() || value == NOT_FOUND {
        None
    } else {
        Some(value)
    }
}

impl MetricsDb {
    pub async fn connect(url: &str) -> Result<Self, ExportError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(ExportError::Database)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> Result<(), ExportError> {
        for ddl in TABLES {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        tracing::info!("Database tables ready");
        Ok(())
    }

    /// Upserts one filing across all tables, keyed by the composite filing
    /// identity. Running the same filing twice leaves one logical record.
    pub async fn upsert_filing(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        self.upsert_summary(record, payload).await?;
        self.upsert_production(record, payload).await?;
        self.upsert_activity(record, payload).await?;
        self.upsert_revenue(record, payload).await?;
        self.upsert_prices(record, payload).await?;
        self.upsert_costs(record, payload).await?;
        self.upsert_basins(record, payload).await?;
        tracing::info!("Stored {} in database", record.label());
        Ok(())
    }

    async fn upsert_summary(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        sqlx::query(
            "INSERT INTO company_summary (ticker, cik, company_name, filing_type, filing_date, time_period)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(ticker, filing_date, filing_type) DO UPDATE
             SET cik = excluded.cik, company_name = excluded.company_name,
                 time_period = excluded.time_period",
        )
        .bind(&record.ticker)
        .bind(&record.cik)
        .bind(&record.company_name)
        .bind(&record.form_type)
        .bind(&record.filing_date)
        .bind(clean_val(&payload.time_period))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_production(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        let p = |key: &str| clean_val(payload.field("production", key)).map(str::to_string);
        sqlx::query(
            "INSERT INTO production_data
             (ticker, company_name, filing_type, filing_date, time_period, quarter, year,
              oil_mbbl_per_day, ngl_mbbl_per_day, gas_mmcf_per_day, boe_mboe_per_day,
              oil_mmbls_total, ngl_mmbls_total, gas_bcf_total, boe_mmboe_total)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ticker, filing_date, filing_type) DO UPDATE
             SET oil_mbbl_per_day = excluded.oil_mbbl_per_day,
                 ngl_mbbl_per_day = excluded.ngl_mbbl_per_day,
                 gas_mmcf_per_day = excluded.gas_mmcf_per_day,
                 boe_mboe_per_day = excluded.boe_mboe_per_day,
                 oil_mmbls_total = excluded.oil_mmbls_total,
                 ngl_mmbls_total = excluded.ngl_mmbls_total,
                 gas_bcf_total = excluded.gas_bcf_total,
                 boe_mmboe_total = excluded.boe_mmboe_total",
        )
        .bind(&record.ticker)
        .bind(&record.company_name)
        .bind(&record.form_type)
        .bind(&record.filing_date)
        .bind(clean_val(&payload.time_period))
        .bind(clean_val(&payload.quarter))
        .bind(clean_val(&payload.year))
        .bind(p("oil_production_mbbl_per_day"))
        .bind(p("ngl_production_mbbl_per_day"))
        .bind(p("gas_production_mmcf_per_day"))
        .bind(p("total_boe_mboe_per_day"))
        .bind(p("oil_production_mmbl_total"))
        .bind(p("ngl_production_mmbl_total"))
        .bind(p("gas_production_bcf_total"))
        .bind(p("total_boe_mmboe_total"))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_activity(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        let a = |key: &str| clean_val(payload.field("activity", key)).map(str::to_string);
        sqlx::query(
            "INSERT INTO activity_wells
             (ticker, company_name, filing_type, filing_date, quarter, year,
              drilling_rigs, gross_wells_drilled, gross_wells_completed, gross_wells_til,
              net_wells_til, avg_lateral_length_drilled, avg_lateral_length_completed,
              working_interest_percent)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ticker, filing_date, filing_type) DO UPDATE
             SET drilling_rigs = excluded.drilling_rigs,
                 gross_wells_drilled = excluded.gross_wells_drilled,
                 gross_wells_completed = excluded.gross_wells_completed,
                 gross_wells_til = excluded.gross_wells_til,
                 net_wells_til = excluded.net_wells_til,
                 avg_lateral_length_drilled = excluded.avg_lateral_length_drilled,
                 avg_lateral_length_completed = excluded.avg_lateral_length_completed,
                 working_interest_percent = excluded.working_interest_percent",
        )
        .bind(&record.ticker)
        .bind(&record.company_name)
        .bind(&record.form_type)
        .bind(&record.filing_date)
        .bind(clean_val(&payload.quarter))
        .bind(clean_val(&payload.year))
        .bind(a("drilling_rigs"))
        .bind(a("gross_wells_drilled"))
        .bind(a("gross_wells_completed"))
        .bind(a("gross_wells_til"))
        .bind(a("net_wells_til"))
        .bind(a("avg_lateral_length_drilled"))
        .bind(a("avg_lateral_length_completed"))
        .bind(a("working_interest_percent"))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_revenue(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        let r = |key: &str| clean_val(payload.field("revenue", key)).map(str::to_string);
        sqlx::query(
            "INSERT INTO revenue_data
             (ticker, company_name, filing_type, filing_date, quarter, year,
              oil_revenue, ngl_revenue, gas_revenue, total_revenue, revenue_per_boe)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ticker, filing_date, filing_type) DO UPDATE
             SET oil_revenue = excluded.oil_revenue,
                 ngl_revenue = excluded.ngl_revenue,
                 gas_revenue = excluded.gas_revenue,
                 total_revenue = excluded.total_revenue,
                 revenue_per_boe = excluded.revenue_per_boe",
        )
        .bind(&record.ticker)
        .bind(&record.company_name)
        .bind(&record.form_type)
        .bind(&record.filing_date)
        .bind(clean_val(&payload.quarter))
        .bind(clean_val(&payload.year))
        .bind(r("oil_revenue"))
        .bind(r("ngl_revenue"))
        .bind(r("gas_revenue"))
        .bind(r("total_revenue"))
        .bind(r("revenue_per_boe"))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_prices(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        let p = |key: &str| clean_val(payload.field("prices", key)).map(str::to_string);
        sqlx::query(
            "INSERT INTO realized_prices
             (ticker, company_name, filing_type, filing_date, quarter, year,
              oil_price, ngl_price, gas_price, boe_price)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ticker, filing_date, filing_type) DO UPDATE
             SET oil_price = excluded.oil_price,
                 ngl_price = excluded.ngl_price,
                 gas_price = excluded.gas_price,
                 boe_price = excluded.boe_price",
        )
        .bind(&record.ticker)
        .bind(&record.company_name)
        .bind(&record.form_type)
        .bind(&record.filing_date)
        .bind(clean_val(&payload.quarter))
        .bind(clean_val(&payload.year))
        .bind(p("oil_price_realized"))
        .bind(p("ngl_price_realized"))
        .bind(p("gas_price_realized"))
        .bind(p("boe_price_realized"))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_costs(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        let c = |key: &str| clean_val(payload.field("costs", key)).map(str::to_string);
        sqlx::query(
            "INSERT INTO cost_data
             (ticker, company_name, filing_type, filing_date, quarter, year,
              production_cost_per_boe, lease_operating_expense_per_boe,
              transportation_cost_per_boe, production_taxes_per_boe,
              development_capex, exploration_capex, total_capex, ddna_per_boe)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(ticker, filing_date, filing_type) DO UPDATE
             SET production_cost_per_boe = excluded.production_cost_per_boe,
                 lease_operating_expense_per_boe = excluded.lease_operating_expense_per_boe,
                 transportation_cost_per_boe = excluded.transportation_cost_per_boe,
                 production_taxes_per_boe = excluded.production_taxes_per_boe,
                 development_capex = excluded.development_capex,
                 exploration_capex = excluded.exploration_capex,
                 total_capex = excluded.total_capex,
                 ddna_per_boe = excluded.ddna_per_boe",
        )
        .bind(&record.ticker)
        .bind(&record.company_name)
        .bind(&record.form_type)
        .bind(&record.filing_date)
        .bind(clean_val(&payload.quarter))
        .bind(clean_val(&payload.year))
        .bind(c("production_cost_per_boe"))
        .bind(c("lease_operating_expense_per_boe"))
        .bind(c("transportation_cost_per_boe"))
        .bind(c("production_taxes_per_boe"))
        .bind(c("development_capex"))
        .bind(c("exploration_capex"))
        .bind(c("total_capex"))
        .bind(c("ddna_per_boe"))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_basins(
        &self,
        record: &FilingRecord,
        payload: &MetricPayload,
    ) -> Result<(), ExportError> {
        for basin_name in payload.basins.keys() {
            let b = |key: &str| clean_val(payload.basin_field(basin_name, key)).map(str::to_string);
            sqlx::query(
                "INSERT INTO basin_data
                 (ticker, company_name, sec_filing_date, file_type, basin_name,
                  gas_reserves, gas_per_day, oil_reserves, oil_per_day,
                  ngl_reserves, ngl_per_day, total_boe, boe_per_day)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(ticker, sec_filing_date, file_type, basin_name) DO UPDATE
                 SET gas_reserves = excluded.gas_reserves,
                     gas_per_day = excluded.gas_per_day,
                     oil_reserves = excluded.oil_reserves,
                     oil_per_day = excluded.oil_per_day,
                     ngl_reserves = excluded.ngl_reserves,
                     ngl_per_day = excluded.ngl_per_day,
                     total_boe = excluded.total_boe,
                     boe_per_day = excluded.boe_per_day",
            )
            .bind(&record.ticker)
            .bind(&record.company_name)
            .bind(&record.filing_date)
            .bind(&record.form_type)
            .bind(basin_name)
            .bind(b("gas_production_bcf_total"))
            .bind(b("gas_production_mmcf_per_day"))
            .bind(b("oil_production_mmbl_total"))
            .bind(b("oil_production_mbbl_per_day"))
            .bind(b("ngl_production_mmbl_total"))
            .bind(b("ngl_production_mbbl_per_day"))
            .bind(b("total_boe_mmboe_total"))
            .bind(b("total_boe_mboe_per_day"))
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

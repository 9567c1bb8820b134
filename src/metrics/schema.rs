// src/metrics/schema.rs

/// Sentinel for a schema field the extraction could not resolve. Distinct
/// from an absent key: payloads always carry every schema field.
pub const NOT_FOUND: &str = "Not found";

/// One metric field: the canonical JSON key, a human-readable label for the
/// spreadsheet sink, and an example value in the expected "value + unit"
/// string format.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub example: &'static str,
}

/// One metric category with its fixed field set.
#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub key: &'static str,
    pub fields: &'static [FieldSpec],
}

const fn field(key: &'static str, label: &'static str, example: &'static str) -> FieldSpec {
    FieldSpec {
        key,
        label,
        example,
    }
}

/// Reporting-period fields carried at the top level of the payload.
pub const PERIOD_FIELDS: &[FieldSpec] = &[
    field("time_period", "Time Period", "Three months ended June 30, 2025"),
    field("quarter", "Quarter", "Q2"),
    field("year", "Year", "2025"),
];

pub const PRODUCTION_FIELDS: &[FieldSpec] = &[
    field("oil_production_mbbl_per_day", "Oil Production (MBbl/d)", "148.4 MBbl/d"),
    field("oil_production_mmbl_total", "Oil Production Total (MMBbl)", "26.9 MMBbl"),
    field("ngl_production_mbbl_per_day", "NGL Production (MBbl/d)", "113.6 MBbl/d"),
    field("ngl_production_mmbl_total", "NGL Production Total (MMBbl)", "20.6 MMBbl"),
    field("gas_production_mmcf_per_day", "Gas Production (MMcf/d)", "3021.1 MMcf/d"),
    field("gas_production_bcf_total", "Gas Production Total (Bcf)", "546.8 Bcf"),
    field("total_boe_mboe_per_day", "Total BOE (MBoe/d)", "765.4 MBoe/d"),
    field("total_boe_mmboe_total", "Total BOE (MMBoe)", "138.5 MMBoe"),
];

pub const ACTIVITY_FIELDS: &[FieldSpec] = &[
    field("drilling_rigs", "Drilling Rigs", "19 rigs"),
    field("gross_wells_drilled", "Gross Wells Drilled", "372 wells"),
    field("gross_wells_completed", "Gross Wells Completed", "410 wells"),
    field("gross_wells_til", "Gross Wells TIL", "358 wells"),
    field("net_wells_til", "Net Wells TIL", "336 wells"),
    field("avg_lateral_length_drilled", "Avg Lateral Length Drilled", "10215 feet"),
    field("avg_lateral_length_completed", "Avg Lateral Length Completed", "13402 feet"),
    field("working_interest_percent", "Working Interest", "80%"),
];

pub const REVENUE_FIELDS: &[FieldSpec] = &[
    field("oil_revenue", "Oil Revenue", "$1,774 million"),
    field("ngl_revenue", "NGL Revenue", "$425 million"),
    field("gas_revenue", "Gas Revenue", "$1,499 million"),
    field("total_revenue", "Total Revenue", "$3,869 million"),
    field("revenue_per_boe", "Revenue per BOE", "$39.61/BOE"),
];

pub const PRICE_FIELDS: &[FieldSpec] = &[
    field("oil_price_realized", "Oil Price", "$66.52/Bbl"),
    field("ngl_price_realized", "NGL Price", "$20.66/Bbl"),
    field("gas_price_realized", "Gas Price", "$2.74/Mcf"),
    field("boe_price_realized", "BOE Price", "$39.61/BOE"),
];

pub const COST_FIELDS: &[FieldSpec] = &[
    field("production_cost_per_boe", "Production Cost per BOE", "$17.78/BOE"),
    field("lease_operating_expense_per_boe", "LOE per BOE", "$2.76/BOE"),
    field("transportation_cost_per_boe", "Transportation Cost per BOE", "$4.00/BOE"),
    field("production_taxes_per_boe", "Production Taxes per BOE", "$1.32/BOE"),
    field("development_capex", "Development CapEx", "$1,121 million"),
    field("exploration_capex", "Exploration CapEx", "$14 million"),
    field("total_capex", "Total CapEx", "$1,192 million"),
    field("ddna_per_boe", "DD&A per BOE", "$7.83/BOE"),
];

/// The fixed category set, in canonical order.
pub const CATEGORIES: &[CategorySpec] = &[
    CategorySpec {
        key: "production",
        fields: PRODUCTION_FIELDS,
    },
    CategorySpec {
        key: "activity",
        fields: ACTIVITY_FIELDS,
    },
    CategorySpec {
        key: "revenue",
        fields: REVENUE_FIELDS,
    },
    CategorySpec {
        key: "prices",
        fields: PRICE_FIELDS,
    },
    CategorySpec {
        key: "costs",
        fields: COST_FIELDS,
    },
];

/// Key of the open-ended basin mapping. Which basins exist is dictated by the
/// model output; each basin sub-record carries the production field set.
pub const BASINS_KEY: &str = "basins";

/// Field shape of one basin sub-record.
pub const BASIN_FIELDS: &[FieldSpec] = PRODUCTION_FIELDS;

/// Total number of fixed (non-basin) metric fields.
pub fn fixed_field_count() -> usize {
    PERIOD_FIELDS.len() + CATEGORIES.iter().map(|c| c.fields.len()).sum::<usize>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_field_keys_are_unique_within_category() {
        for category in CATEGORIES {
            let keys: HashSet<_> = category.fields.iter().map(|f| f.key).collect();
            assert_eq!(keys.len(), category.fields.len(), "{}", category.key);
        }
    }

    #[test]
    fn test_fixed_field_count() {
        // 3 period + 8 production + 8 activity + 5 revenue + 4 prices + 8 costs
        assert_eq!(fixed_field_count(), 36);
    }
}

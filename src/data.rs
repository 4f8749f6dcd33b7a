//! The dashboard's data table.
//!
//! Every value here is a pre-computed literal. The table lives in a `static`
//! and is only reachable through [`bombo_data`], so nothing can mutate it at
//! runtime.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct BomboData {
    pub company: CompanyProfile,
    pub key_metrics: KeyMetrics,
    pub monthly: &'static [MonthlyPoint],
    pub unit_economics: UnitEconomics,
    pub segments: &'static [Segment],
    pub cohorts: &'static [Cohort],
    pub sections: &'static [NarrativeSection],
}

#[derive(Debug, Serialize)]
pub struct CompanyProfile {
    pub name: &'static str,
    pub tagline: &'static str,
    pub stage: &'static str,
    /// Last month covered by the table, `YYYY-MM`.
    pub as_of: &'static str,
}

/// Headline figures shown on the metric cards.
#[derive(Debug, Serialize)]
pub struct KeyMetrics {
    pub total_users: u32,
    pub monthly_active_users: u32,
    pub total_gtv: f64,
    pub monthly_gtv: f64,
    /// Mean month-1 cohort retention, in percent.
    pub retention_rate: f64,
    /// Latest month-over-month GTV change, in percent.
    pub gtv_growth: f64,
    pub total_transactions: u32,
    pub avg_transaction_value: f64,
}

#[derive(Debug, Serialize)]
pub struct MonthlyPoint {
    pub month: &'static str,
    pub mau: u32,
    pub dau: u32,
    pub new_users: u32,
    pub gtv: f64,
}

#[derive(Debug, Serialize)]
pub struct UnitEconomics {
    pub ltv: f64,
    pub cac: f64,
    pub payback_months: f64,
    pub gross_margin: f64,
    pub contribution_margin: f64,
}

#[derive(Debug, Serialize)]
pub struct Segment {
    pub name: &'static str,
    pub users: u32,
}

/// Retention of one signup cohort; `retention[n]` is the percentage still
/// active `n` months after signup, so `retention[0]` is always 100.
#[derive(Debug, Serialize)]
pub struct Cohort {
    pub label: &'static str,
    pub retention: &'static [f64],
}

#[derive(Debug, Serialize)]
pub struct NarrativeSection {
    pub id: &'static str,
    pub title: &'static str,
    pub body: &'static str,
}

#[must_use]
pub fn bombo_data() -> &'static BomboData {
    &BOMBO_DATA
}

static BOMBO_DATA: BomboData = BomboData {
    company: CompanyProfile {
        name: "Bombo",
        tagline: "Social payments for the next hundred million wallets",
        stage: "Series A",
        as_of: "2025-06",
    },
    key_metrics: KeyMetrics {
        total_users: 801_492,
        monthly_active_users: 316_369,
        total_gtv: 70_045_672.0,
        monthly_gtv: 9_352_983.0,
        retention_rate: 56.93,
        gtv_growth: 25.3,
        total_transactions: 1_624_318,
        avg_transaction_value: 43.12,
    },
    monthly: &[
        MonthlyPoint { month: "2024-07", mau: 69_601, dau: 16_704, new_users: 29_503, gtv: 2_397_667.0 },
        MonthlyPoint { month: "2024-08", mau: 88_583, dau: 21_703, new_users: 37_370, gtv: 2_997_084.0 },
        MonthlyPoint { month: "2024-09", mau: 107_565, dau: 26_891, new_users: 44_254, gtv: 3_596_501.0 },
        MonthlyPoint { month: "2024-10", mau: 129_711, dau: 33_076, new_users: 51_138, gtv: 4_315_801.0 },
        MonthlyPoint { month: "2024-11", mau: 151_857, dau: 39_483, new_users: 57_039, gtv: 5_035_102.0 },
        MonthlyPoint { month: "2024-12", mau: 174_003, dau: 45_589, new_users: 62_939, gtv: 5_754_402.0 },
        MonthlyPoint { month: "2025-01", mau: 196_149, dau: 51_979, new_users: 68_840, gtv: 6_353_819.0 },
        MonthlyPoint { month: "2025-02", mau: 218_295, dau: 58_503, new_users: 74_740, gtv: 6_953_236.0 },
        MonthlyPoint { month: "2025-03", mau: 240_440, dau: 64_919, new_users: 80_641, gtv: 7_552_652.0 },
        MonthlyPoint { month: "2025-04", mau: 262_586, dau: 71_423, new_users: 88_508, gtv: 8_271_953.0 },
        MonthlyPoint { month: "2025-05", mau: 287_896, dau: 79_171, new_users: 98_343, gtv: 7_464_472.0 },
        MonthlyPoint { month: "2025-06", mau: 316_369, dau: 87_951, new_users: 108_177, gtv: 9_352_983.0 },
    ],
    unit_economics: UnitEconomics {
        ltv: 186.4,
        cac: 23.9,
        payback_months: 4.2,
        gross_margin: 38.5,
        contribution_margin: 21.7,
    },
    segments: &[
        Segment { name: "Consumers", users: 612_340 },
        Segment { name: "Merchants", users: 143_907 },
        Segment { name: "Creators", users: 45_245 },
    ],
    cohorts: &[
        Cohort { label: "2024-12", retention: &[100.0, 54.1, 44.8, 39.6, 36.2, 34.0, 32.7] },
        Cohort { label: "2025-01", retention: &[100.0, 55.8, 46.1, 40.9, 37.5, 35.6] },
        Cohort { label: "2025-02", retention: &[100.0, 56.4, 47.3, 42.2, 38.8] },
        Cohort { label: "2025-03", retention: &[100.0, 57.9, 48.6, 43.5] },
        Cohort { label: "2025-04", retention: &[100.0, 58.6, 49.4] },
        Cohort { label: "2025-05", retention: &[100.0, 58.78] },
    ],
    sections: &[
        NarrativeSection {
            id: "summary",
            title: "Executive Summary",
            body: "Bombo turns everyday peer-to-peer transfers into a social feed that merchants and creators can sell into. \
                   Twelve months after launch the network moves more than nine million dollars a month, \
                   with growth driven almost entirely by referrals.",
        },
        NarrativeSection {
            id: "traction",
            title: "Traction",
            body: "Monthly actives grew more than fourfold over the last year while daily engagement deepened: \
                   over a quarter of monthly users now open the app every day. \
                   May's dip reflects a payment-partner migration; volume recovered within the following month.",
        },
        NarrativeSection {
            id: "economics",
            title: "Unit Economics",
            body: "Organic acquisition keeps blended CAC low and payback inside two quarters. \
                   Interchange and instant-transfer fees carry gross margin, and merchant tooling \
                   is expected to lift contribution margin as that segment matures.",
        },
        NarrativeSection {
            id: "market",
            title: "Market Opportunity",
            body: "Mobile wallets are the default way to pay among under-35s in our launch markets, \
                   yet no incumbent pairs payments with a social graph that merchants can reach directly.",
        },
        NarrativeSection {
            id: "funds",
            title: "Use of Funds",
            body: "The round funds expansion into two neighbouring markets, a merchant acquiring team, \
                   and the licensing work needed to hold customer balances in-house.",
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessor_returns_the_same_table() {
        assert!(std::ptr::eq(bombo_data(), bombo_data()));
    }

    #[test]
    fn monthly_series_is_chronological() {
        let months: Vec<&str> = bombo_data().monthly.iter().map(|p| p.month).collect();
        let mut sorted = months.clone();
        sorted.sort_unstable();
        assert_eq!(months, sorted);
        assert_eq!(months.last().copied(), Some(bombo_data().company.as_of));
    }

    #[test]
    fn totals_match_the_series() {
        let data = bombo_data();
        let gtv: f64 = data.monthly.iter().map(|p| p.gtv).sum();
        assert!((gtv - data.key_metrics.total_gtv).abs() < 0.5);

        let new_users: u32 = data.monthly.iter().map(|p| p.new_users).sum();
        assert_eq!(new_users, data.key_metrics.total_users);

        let segment_users: u32 = data.segments.iter().map(|s| s.users).sum();
        assert_eq!(segment_users, data.key_metrics.total_users);
    }

    #[test]
    fn latest_month_matches_headline() {
        let data = bombo_data();
        let last = data.monthly.last().expect("series is not empty");
        assert_eq!(last.mau, data.key_metrics.monthly_active_users);
        assert!((last.gtv - data.key_metrics.monthly_gtv).abs() < f64::EPSILON);
    }

    #[test]
    fn cohorts_start_at_full_retention() {
        for cohort in bombo_data().cohorts {
            assert_eq!(cohort.retention.first().copied(), Some(100.0));
            assert!(cohort.retention.windows(2).all(|w| w[1] <= w[0]));
        }
    }

    #[test]
    fn section_ids_are_unique() {
        let sections = bombo_data().sections;
        for (idx, section) in sections.iter().enumerate() {
            assert!(sections[idx + 1..].iter().all(|other| other.id != section.id));
        }
    }
}

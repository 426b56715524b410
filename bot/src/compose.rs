use reflexer::StatsRecord;

/// Message layouts. Padding lines the values up in the Twitter font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Template {
    /// "RAI update" text post
    Update,
    /// "RAI stats" post that goes out with the dashboard screenshot
    Stats,
}

impl Template {
    pub fn render(self, stats: &StatsRecord) -> String {
        let StatsRecord {
            market_price,
            oracle_price,
            redemption_price,
            annualized_rate,
        } = stats;

        match self {
            Template::Update => format!(
                "🗿 RAI update 🗿

Market Price: ${market_price}
Oracle Price: ${oracle_price}
Redemption Price: ${redemption_price}
Annualized Redemption Rate: {annualized_rate}%
"
            ),
            Template::Stats => format!(
                "📊 RAI stats 📊

Market Price:           ${market_price}
Oracle Price:            ${oracle_price}
Redemption Price:   ${redemption_price}
Redemption Rate:     {annualized_rate}%
"
            ),
        }
    }

    pub fn labels_annualized(self) -> bool {
        matches!(self, Template::Update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> StatsRecord {
        StatsRecord {
            market_price: "3.0000".into(),
            oracle_price: "3.1500".into(),
            redemption_price: "3.1400".into(),
            annualized_rate: "0.0000".into(),
        }
    }

    #[test]
    fn renders_update_template() {
        assert_eq!(
            Template::Update.render(&stats()),
            "🗿 RAI update 🗿\n\
             \n\
             Market Price: $3.0000\n\
             Oracle Price: $3.1500\n\
             Redemption Price: $3.1400\n\
             Annualized Redemption Rate: 0.0000%\n"
        );
    }

    #[test]
    fn renders_stats_template() {
        let message = Template::Stats.render(&stats());

        assert!(message.starts_with("📊 RAI stats 📊\n\n"));
        assert!(message.contains("Redemption Price:   $3.1400\n"));
        assert!(message.ends_with("Redemption Rate:     0.0000%\n"));
    }

    #[test]
    fn rendering_is_deterministic() {
        for template in [Template::Update, Template::Stats] {
            assert_eq!(template.render(&stats()), template.render(&stats().clone()));
        }
    }
}

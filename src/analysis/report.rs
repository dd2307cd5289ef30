use std::fmt::{self, Write};

use super::AnalysisResult;
use crate::data::model::Covariate;

const WIDTH: usize = 70;

fn heading(out: &mut impl Write, title: &str) -> fmt::Result {
    let rule = "=".repeat(WIDTH);
    writeln!(out, "\n{rule}\n{title}\n{rule}")
}

fn subheading(out: &mut impl Write, title: &str) -> fmt::Result {
    writeln!(out, "\n{title}\n{}", "-".repeat(WIDTH))
}

/// Human-readable text rendering of an analysis run.
pub struct ConsoleReport<'a>(pub &'a AnalysisResult);

impl ConsoleReport<'_> {
    fn contingency(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(out, "CONTINGENCY TABLE ANALYSIS - Chi-Square Test")?;
        for (species, test) in self.0.contingency_analysis.iter() {
            subheading(out, species)?;
            let habitats: Vec<&str> = test
                .contingency_table
                .iter()
                .next()
                .map(|(_, by_habitat)| by_habitat.keys().collect())
                .unwrap_or_default();
            let label_width = habitats.iter().map(|h| h.len()).max().unwrap_or(0).max(8);

            write!(out, "{:label_width$}", "")?;
            for presence in test.contingency_table.keys() {
                write!(out, " {presence:>6}")?;
            }
            writeln!(out)?;
            for habitat in &habitats {
                write!(out, "{habitat:label_width$}")?;
                for (_, by_habitat) in test.contingency_table.iter() {
                    let count = by_habitat.get(habitat).copied().unwrap_or(0);
                    write!(out, " {count:>6}")?;
                }
                writeln!(out)?;
            }

            let verdict = if test.significant {
                "SIGNIFICANT"
            } else {
                "NOT SIGNIFICANT"
            };
            writeln!(out, "\nChi-square statistic: {:.4}", test.chi2_statistic)?;
            writeln!(out, "P-value: {:.4e}", test.p_value)?;
            writeln!(out, "Result: {verdict} habitat preference")?;
        }
        Ok(())
    }

    fn occurrence(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(out, "OCCURRENCE RATES BY HABITAT TYPE")?;
        let mut current: Option<&str> = None;
        for rate in &self.0.occurrence_rates {
            if current != Some(rate.water_body_type.as_str()) {
                current = Some(rate.water_body_type.as_str());
                subheading(
                    out,
                    &format!(
                        "{} (n={})",
                        rate.water_body_type.to_uppercase(),
                        rate.n_observations
                    ),
                )?;
            }
            writeln!(
                out,
                "  {}: {}/{} ({:.1}%)",
                rate.species, rate.occurrences, rate.n_observations, rate.occurrence_rate
            )?;
        }
        Ok(())
    }

    fn characteristics(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(out, "HABITAT ENVIRONMENTAL CHARACTERISTICS")?;
        for (habitat, stats) in self.0.habitat_characteristics.iter() {
            subheading(out, &habitat.to_uppercase())?;
            for c in Covariate::ALL {
                let s = stats.get(c);
                writeln!(out, "  {}: {:.2} ± {:.2}", c.label(), s.mean, s.std_dev)?;
            }
        }
        Ok(())
    }

    fn summary(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        heading(out, "SUMMARY OF HABITAT PREFERENCES")?;
        for (species, pref) in self.0.summary.iter() {
            writeln!(out, "\n{species}")?;
            writeln!(out, "  Preferred habitat: {}", pref.preferred_habitat)?;
            writeln!(
                out,
                "  Occurrence rate in preferred habitat: {:.1}%",
                pref.preference_rate
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for ConsoleReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.contingency(f)?;
        self.occurrence(f)?;
        self.characteristics(f)?;
        self.summary(f)
    }
}

pub fn render_console(result: &AnalysisResult) -> String {
    ConsoleReport(result).to_string()
}

use serde::Serialize;
use shelfwise_core::config::{AppConfig, LoadOptions};
use shelfwise_core::{Product, RecommendationEngine, TrendingSignal};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            let engine = RecommendationEngine::from_config(&config);
            checks.push(check_engine_health(&engine));
            checks.push(check_scoring(&engine));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["engine_health", "scoring_sanity"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_engine_health(engine: &RecommendationEngine) -> DoctorCheck {
    let health = engine.health();
    let status = if health.status == "healthy" { CheckStatus::Pass } else { CheckStatus::Fail };
    DoctorCheck {
        name: "engine_health",
        status,
        details: format!("{} is {} (backend `{}`)", health.service, health.status, health.backend_url),
    }
}

/// Score a two-product fixture and confirm the stock filter holds.
fn check_scoring(engine: &RecommendationEngine) -> DoctorCheck {
    let pool = vec![Product::new("doctor-in-stock").with_stock(1), Product::new("doctor-sold-out")];
    let signals =
        vec![TrendingSignal::new("doctor-in-stock", 4), TrendingSignal::new("doctor-sold-out", 8)];

    let result = engine.trending(&signals, &pool, engine.limits().trending);
    let passed = result.len() == 1 && result[0].product_id.as_str() == "doctor-in-stock";

    DoctorCheck {
        name: "scoring_sanity",
        status: if passed { CheckStatus::Pass } else { CheckStatus::Fail },
        details: if passed {
            "trending fixture ranked only available products".to_string()
        } else {
            format!("unexpected trending fixture result: {} entries", result.len())
        },
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

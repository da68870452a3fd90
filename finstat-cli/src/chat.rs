//! Conversational layer: a stdin REPL over the loaded transactions.
//!
//! Each turn the loop hands the precomputed entity breakdown to whichever
//! answerer is available: a configured LLM provider first, and on any
//! failure (or no provider at all) the deterministic templates. The
//! templates answer the common questions — highest-revenue entity, totals,
//! statement explainers — from the breakdown alone.

use anyhow::Result;
use std::io::{BufRead, Write};

use finstat_core::{Chart, Transaction};
use finstat_reports::{entity_breakdown, EntityBreakdown};

use crate::config;
use crate::llm;

fn system_prompt() -> &'static str {
    "You are a financial analyst assistant. Answer questions about the user's \
ledger data using the aggregates provided in the conversation: revenue by \
entity, expenses by entity, and per-entity activity. Quote specific numbers \
and entity names from that data. Do not ask the user to upload data that is \
already provided. Be concise and concrete."
}

/// The precomputed context message sent alongside the user's question.
fn context_message(breakdown: &EntityBreakdown) -> String {
    let mut out = String::new();
    out.push_str("=== TRANSACTION DATA ANALYSIS ===\n");
    out.push_str(&format!("Total transactions: {}\n", breakdown.total_transactions));
    out.push_str(&format!("Unique entities: {}\n\n", breakdown.summary.len()));

    if !breakdown.revenue_by_entity.is_empty() {
        out.push_str("REVENUE BY ENTITY:\n");
        out.push_str(&serde_json::to_string_pretty(&breakdown.revenue_by_entity).unwrap_or_default());
        out.push_str("\n\n");
        if let Some((name, total)) = breakdown.highest_revenue() {
            out.push_str(&format!("HIGHEST REVENUE ENTITY: {name} with ${total:.2}\n\n"));
        }
    }
    if !breakdown.expenses_by_entity.is_empty() {
        out.push_str("EXPENSES BY ENTITY:\n");
        out.push_str(&serde_json::to_string_pretty(&breakdown.expenses_by_entity).unwrap_or_default());
        out.push_str("\n\n");
    }
    out.push_str("ENTITY SUMMARY:\n");
    out.push_str(&serde_json::to_string_pretty(&breakdown.summary).unwrap_or_default());
    out
}

/// Rule-based answer used when no LLM is configured or the call fails.
pub fn fallback_reply(message: &str, breakdown: &EntityBreakdown) -> String {
    let m = message.to_lowercase();
    let has_data = breakdown.total_transactions > 0;

    let asks_entities = m.contains("subsidiary")
        || m.contains("entity")
        || m.contains("entities")
        || m.contains("highest revenue")
        || (m.contains("compare") && m.contains("revenue"))
        || (m.contains("which") && m.contains("highest"));

    if has_data && asks_entities {
        return match breakdown.highest_revenue() {
            Some((highest_name, highest_total)) => {
                let mut out = String::from("Revenue by entity:\n");
                out.push_str(&format!(
                    "Highest revenue entity: {highest_name} (${highest_total:.2})\n"
                ));
                for (i, (name, total)) in breakdown.revenue_ranking().iter().enumerate() {
                    let pct = if highest_total > 0.0 {
                        total / highest_total * 100.0
                    } else {
                        0.0
                    };
                    out.push_str(&format!("{}. {name}: ${total:.2} ({pct:.1}% of highest)\n", i + 1));
                }
                if let Some(exp) = breakdown.expenses_by_entity.get(highest_name) {
                    out.push_str(&format!(
                        "Net income for {highest_name}: ${:.2} (revenue ${highest_total:.2} - expenses ${exp:.2})\n",
                        highest_total - exp
                    ));
                }
                out
            }
            None => "No revenue transactions found. Revenue rows need an account \
containing Revenue/Sales/Income and type 'credit'."
                .to_string(),
        };
    }

    if has_data && m.contains("revenue") && (m.contains("total") || m.contains("ytd") || m.contains("year")) {
        let total = breakdown.total_revenue();
        let mut out = format!("Total revenue: ${total:.2}\n");
        for (name, rev) in breakdown.revenue_ranking() {
            let pct = if total > 0.0 { rev / total * 100.0 } else { 0.0 };
            out.push_str(&format!("- {name}: ${rev:.2} ({pct:.1}%)\n"));
        }
        return out;
    }

    if has_data && (m.contains("revenue") || m.contains("expense")) {
        let revenue = breakdown.total_revenue();
        let expenses = breakdown.total_expenses();
        return format!(
            "Total revenue: ${revenue:.2}\nTotal expenses: ${expenses:.2}\nNet income: ${:.2}",
            revenue - expenses
        );
    }

    if m.contains("variance") || m.contains("compare") {
        return "I can compare periods once you run the revenue-variance KPI \
(finstat kpi revenue-variance). For AI-powered analysis, configure an API key."
            .to_string();
    }
    if m.contains("balance sheet") || m.contains("assets") || m.contains("liabilities") {
        return "The balance sheet shows assets, liabilities and equity at a point \
in time. Run: finstat statements --csv <file>."
            .to_string();
    }
    if m.contains("cash flow") || m.contains("cashflow") {
        return "The cash flow statement groups cash movements into operating, \
investing and financing activities. Run: finstat statements --csv <file>."
            .to_string();
    }

    if has_data {
        format!(
            "I have {} transactions loaded. Try asking:\n\
- Which entity has the highest revenue?\n\
- What's the total revenue?\n\
- Compare revenue across entities\n\
For AI-powered analysis, configure an API key in ~/.finstat/config.toml.",
            breakdown.total_transactions
        )
    } else {
        "No transactions loaded. Start chat with --csv <file> to ask questions \
about your data."
            .to_string()
    }
}

/// Run the REPL until EOF or an exit command.
pub async fn run_chat(txns: &[Transaction], chart: &Chart) -> Result<()> {
    let cfg = config::load_config()?;
    let llm_cfg = llm::default_config()?;
    let breakdown = entity_breakdown(txns, chart);
    let context = context_message(&breakdown);

    println!(
        "finstat chat — {} transactions loaded ({}). Type 'quit' to exit.",
        breakdown.total_transactions,
        if llm_cfg.is_some() { "LLM configured" } else { "rule-based answers" },
    );

    let stdin = std::io::stdin();
    let mut turns: Vec<llm::ChatTurn> = Vec::new();

    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "quit" | "exit" | "q") {
            break;
        }

        let reply = match &llm_cfg {
            Some(cfg_llm) => {
                let mut window = recent_turns(&turns, cfg.chat.max_turns_context);
                window.push(llm::ChatTurn {
                    role: "user".to_string(),
                    content: format!("{message}\n\n{context}"),
                });
                match llm::chat_complete(cfg_llm, system_prompt(), &window).await {
                    Ok(s) if !s.trim().is_empty() => s,
                    _ => fallback_reply(message, &breakdown),
                }
            }
            None => fallback_reply(message, &breakdown),
        };

        println!("finstat> {reply}\n");

        turns.push(llm::ChatTurn {
            role: "user".to_string(),
            content: message.to_string(),
        });
        turns.push(llm::ChatTurn {
            role: "assistant".to_string(),
            content: reply,
        });
    }

    Ok(())
}

fn recent_turns(turns: &[llm::ChatTurn], max: usize) -> Vec<llm::ChatTurn> {
    let start = turns.len().saturating_sub(max);
    turns[start..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use finstat_core::RawRecord;
    use serde_json::json;

    fn breakdown() -> EntityBreakdown {
        let rows: Vec<Transaction> = [
            ("Revenue - Consulting", 1000.0, "credit", Some("Acme AU")),
            ("Sales", 400.0, "credit", Some("Acme NZ")),
            ("Rent", 250.0, "debit", Some("Acme AU")),
        ]
        .iter()
        .map(|(account, amount, entry_type, entity)| {
            Transaction::from_raw(&RawRecord {
                date: "2024-01-05".to_string(),
                account: account.to_string(),
                amount: json!(amount),
                entry_type: entry_type.to_string(),
                entity: entity.map(str::to_string),
                ..RawRecord::default()
            })
        })
        .collect();
        entity_breakdown(&rows, &Chart::default())
    }

    #[test]
    fn test_highest_revenue_question() {
        let reply = fallback_reply("Which subsidiary has the highest revenue?", &breakdown());
        assert!(reply.contains("Acme AU"));
        assert!(reply.contains("$1000.00"));
    }

    #[test]
    fn test_total_revenue_question() {
        let reply = fallback_reply("what is the total revenue this year", &breakdown());
        assert!(reply.contains("$1400.00"));
    }

    #[test]
    fn test_statement_explainer_without_data_dependency() {
        let reply = fallback_reply("how do I read a balance sheet?", &breakdown());
        assert!(reply.contains("assets"));
    }

    #[test]
    fn test_empty_data_default_reply() {
        let empty = entity_breakdown(&[], &Chart::default());
        let reply = fallback_reply("hello", &empty);
        assert!(reply.contains("No transactions loaded"));
    }

    #[test]
    fn test_context_message_names_highest_entity() {
        let ctx = context_message(&breakdown());
        assert!(ctx.contains("REVENUE BY ENTITY"));
        assert!(ctx.contains("HIGHEST REVENUE ENTITY: Acme AU"));
    }
}

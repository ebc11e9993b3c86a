//! Lenient parsing of auditor JSON replies.
//!
//! Models get field types wrong often enough that strict deserialization
//! would throw away usable verdicts, so fields are read one by one with
//! defaults. Only a missing score rejects a reply.

use crate::analysis::policy::clamp_score;
use crate::models::{AiTier, HireSignal, ProfileAudit, RepoAudit};
use serde_json::Value;

/// Read a score given as an integer, a float, or a numeric string.
///
/// Non-integers are rounded, and the result is clamped to 0-100.
pub fn parse_score(value: &Value) -> Option<i32> {
    let raw = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok()?,
        _ => return None,
    };

    if !raw.is_finite() {
        return None;
    }

    Some(clamp_score(raw.round().clamp(i32::MIN as f64, i32::MAX as f64) as i32))
}

/// Collect the string items of a JSON array; anything else yields empty.
pub fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// The AI tier band a score falls in, used when the reply omits the tier.
pub fn ai_tier_for_score(score: i32) -> AiTier {
    if score >= 90 {
        AiTier::Flagship
    } else if score >= 70 {
        AiTier::Solid
    } else if score >= 40 {
        AiTier::Neutral
    } else {
        AiTier::Noise
    }
}

/// Build a repository verdict from a reply.
pub fn parse_repo_audit(json: &Value) -> Option<RepoAudit> {
    let score = parse_score(&json["score"])?;

    Some(RepoAudit {
        score,
        tier: json["tier"]
            .as_str()
            .and_then(AiTier::parse)
            .unwrap_or_else(|| ai_tier_for_score(score)),
        hire_signal: json["hire_signal"]
            .as_str()
            .and_then(HireSignal::parse)
            .unwrap_or(HireSignal::Weak),
        explanation: json["explanation"].as_str().unwrap_or("").trim().to_string(),
        red_flags: string_list(&json["red_flags"]),
        suggested_actions: string_list(&json["suggested_actions"]),
    })
}

/// Build a profile verdict from a reply.
pub fn parse_profile_audit(json: &Value) -> Option<ProfileAudit> {
    let score = parse_score(&json["score"])?;
    let text = |key: &str, fallback: &str| {
        json[key]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback)
            .to_string()
    };

    Some(ProfileAudit {
        score,
        nickname: text("nickname", "The Unranked"),
        headline: text("headline", ""),
        summary: text("summary", ""),
        strengths: string_list(&json["strengths"]),
        missing_elements: string_list(&json["missing_elements"]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_score_variants() {
        assert_eq!(parse_score(&json!(72)), Some(72));
        assert_eq!(parse_score(&json!(72.6)), Some(73));
        assert_eq!(parse_score(&json!("85")), Some(85));
        assert_eq!(parse_score(&json!("64%")), Some(64));
        assert_eq!(parse_score(&json!(140)), Some(100));
        assert_eq!(parse_score(&json!(-3)), Some(0));
        assert_eq!(parse_score(&json!(null)), None);
        assert_eq!(parse_score(&json!("high")), None);
    }

    #[test]
    fn test_parse_full_repo_audit() {
        let reply = json!({
            "score": 82,
            "tier": "SOLID",
            "hire_signal": "Yes",
            "explanation": "Working app with tests.",
            "red_flags": ["Buzzword stack"],
            "suggested_actions": ["Add CI", 7]
        });

        let audit = parse_repo_audit(&reply).unwrap();
        assert_eq!(audit.score, 82);
        assert_eq!(audit.tier, AiTier::Solid);
        assert_eq!(audit.hire_signal, HireSignal::Yes);
        assert_eq!(audit.red_flags, vec!["Buzzword stack"]);
        assert_eq!(audit.suggested_actions, vec!["Add CI"]);
    }

    #[test]
    fn test_repo_audit_defaults() {
        let audit = parse_repo_audit(&json!({"score": 45, "tier": "SUPPORTING"})).unwrap();
        assert_eq!(audit.tier, AiTier::Neutral);
        assert_eq!(audit.hire_signal, HireSignal::Weak);
        assert!(audit.explanation.is_empty());
        assert!(audit.red_flags.is_empty());

        assert!(parse_repo_audit(&json!({"tier": "FLAGSHIP"})).is_none());
    }

    #[test]
    fn test_ai_tier_bands() {
        assert_eq!(ai_tier_for_score(100), AiTier::Flagship);
        assert_eq!(ai_tier_for_score(90), AiTier::Flagship);
        assert_eq!(ai_tier_for_score(89), AiTier::Solid);
        assert_eq!(ai_tier_for_score(40), AiTier::Neutral);
        assert_eq!(ai_tier_for_score(39), AiTier::Noise);
    }

    #[test]
    fn test_parse_profile_audit() {
        let reply = json!({
            "score": 68,
            "nickname": "The Full-Stack Catalyst",
            "headline": "Promising student",
            "summary": "Clear stack. Thin README.",
            "strengths": ["Pinned projects"],
            "missing_elements": ["Missing LinkedIn link"]
        });
        let audit = parse_profile_audit(&reply).unwrap();
        assert_eq!(audit.score, 68);
        assert_eq!(audit.nickname, "The Full-Stack Catalyst");
        assert_eq!(audit.missing_elements, vec!["Missing LinkedIn link"]);

        let sparse = parse_profile_audit(&json!({"score": 30})).unwrap();
        assert_eq!(sparse.nickname, "The Unranked");
    }
}

//! Heuristic task classifier: keyword rule tables -> domain, priority, duration.
//!
//! This is the fallback path used when no confident semantic classifier
//! result is available. Every table is evaluated first-match-wins against the
//! lowercased task text, so each rule can be tested on its own.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::domain::Domain;
use crate::task::{MAX_TASK_MINUTES, MIN_TASK_MINUTES, Priority, PriorityPolarity};

/// Confidence reported when a domain keyword matched.
pub const KEYWORD_CONFIDENCE: f64 = 0.5;
/// Confidence reported when nothing matched and the default domain was used.
pub const DEFAULT_CONFIDENCE: f64 = 0.3;

const BASE_PRIORITY: i64 = 3;
const SHORT_TASK_FLOOR: i64 = 15;

/// Domain keyword sets in evaluation order. The life set is last; no match at
/// all also lands on life.
pub const DOMAIN_RULES: &[(Domain, &[&str])] = &[
    (
        Domain::Academic,
        &[
            "论文", "考试", "研究", "文献", "课程", "作业", "实验", "学习", "算法", "导师",
            "代码", "编程", "程序", "软件", "paper", "thesis", "exam", "study", "research",
            "lecture", "homework", "course", "algorithm",
        ],
    ),
    (
        Domain::Income,
        &[
            "工作", "项目", "会议", "客户", "报告", "工资", "报销", "票据", "劳务费", "银行",
            "发票", "work", "project", "client", "invoice", "salary", "meeting", "budget",
        ],
    ),
    (
        Domain::Growth,
        &[
            "健身", "锻炼", "运动", "跑步", "瑜伽", "技能", "提升", "冥想", "探索", "读书",
            "了解", "试一试", "exercise", "workout", "gym", "yoga", "meditate", "skill", "explore",
            "practice",
        ],
    ),
    (
        Domain::Life,
        &[
            "购买", "打扫", "做饭", "缴费", "家庭", "娱乐", "买药", "洗衣", "邮件", "回信",
            "shopping", "clean", "cook", "laundry", "groceries", "email", "doctor",
        ],
    ),
];

/// Priority overrides in evaluation order: urgent, then today/important,
/// then optional. Values are on the 1 = most urgent scale and are mapped to
/// the configured polarity after the domain boost.
pub const PRIORITY_RULES: &[(&[&str], i64)] = &[
    (&["紧急", "马上", "立即", "立刻", "今天必须", "urgent", "asap", "immediately"], 1),
    (&["今天", "尽快", "重要", "today", "soon", "tonight", "important"], 2),
    (
        &["有空", "随时", "可选", "试试", "试一试", "看看", "了解", "whenever", "optional", "someday"],
        4,
    ),
];

/// How a duration rule changes the per-domain base estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationAdjust {
    Add(i64),
    /// Subtract, but never go below the floor.
    SubtractWithFloor(i64, i64),
}

impl DurationAdjust {
    pub fn apply(self, minutes: i64) -> i64 {
        match self {
            DurationAdjust::Add(n) => minutes + n,
            DurationAdjust::SubtractWithFloor(n, floor) => (minutes - n).max(floor),
        }
    }
}

/// Duration adjustments in evaluation order; only the first hit applies.
pub const DURATION_RULES: &[(&[&str], DurationAdjust)] = &[
    (
        &["撰写", "编写", "整理", "分析", "write", "compose", "organize", "analyze", "draft"],
        DurationAdjust::Add(15),
    ),
    (
        &["回复", "回信", "联系", "打电话", "reply", "respond", "contact", "call"],
        DurationAdjust::SubtractWithFloor(15, SHORT_TASK_FLOOR),
    ),
    (
        &["会议", "开会", "讨论", "面试", "meeting", "discuss", "interview"],
        DurationAdjust::Add(30),
    ),
];

// Explicit duration markers like "30m", "45 min", "45分钟", "2h", "1.5小时".
static RE_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<num>\d+(?:\.\d+)?)\s*(?P<unit>小时|分钟|hours?|hrs?|h|minutes?|mins?|m)(?:[^a-z]|$)",
    )
    .unwrap()
});

/// Result of classifying one task description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub domain: Domain,
    pub priority: Priority,
    pub estimated_minutes: i64,
    pub confidence: f64,
    pub reasoning: String,
}

/// Domain decision plus the keyword that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainMatch {
    pub domain: Domain,
    pub keyword: Option<&'static str>,
}

impl DomainMatch {
    pub fn confidence(&self) -> f64 {
        if self.keyword.is_some() {
            KEYWORD_CONFIDENCE
        } else {
            DEFAULT_CONFIDENCE
        }
    }

    pub fn reasoning(&self) -> String {
        match self.keyword {
            Some(kw) => format!("keyword '{}' matched {}", kw, self.domain),
            None => format!("no domain keyword matched; defaulted to {}", self.domain),
        }
    }
}

/// Keyword classifier. Priorities come out on the configured scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier {
    polarity: PriorityPolarity,
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_polarity(polarity: PriorityPolarity) -> Self {
        Self { polarity }
    }

    pub fn polarity(&self) -> PriorityPolarity {
        self.polarity
    }

    pub fn classify(&self, text: &str) -> Classification {
        let text = normalize(text);
        let matched = match_domain(&text);
        let priority = estimate_priority(&text, matched.domain, self.polarity);
        let estimated_minutes = estimate_minutes(&text, matched.domain);

        Classification {
            domain: matched.domain,
            priority,
            estimated_minutes,
            confidence: matched.confidence(),
            reasoning: matched.reasoning(),
        }
    }

    pub fn classify_domain(&self, text: &str) -> DomainMatch {
        match_domain(&normalize(text))
    }

    pub fn priority(&self, text: &str, domain: Domain) -> Priority {
        estimate_priority(&normalize(text), domain, self.polarity)
    }

    pub fn minutes(&self, text: &str, domain: Domain) -> i64 {
        estimate_minutes(&normalize(text), domain)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn first_hit(text: &str, keywords: &[&'static str]) -> Option<&'static str> {
    keywords.iter().copied().find(|kw| text.contains(kw))
}

fn match_domain(text: &str) -> DomainMatch {
    for (domain, keywords) in DOMAIN_RULES {
        if let Some(kw) = first_hit(text, keywords) {
            return DomainMatch {
                domain: *domain,
                keyword: Some(kw),
            };
        }
    }
    DomainMatch {
        domain: Domain::Life,
        keyword: None,
    }
}

fn estimate_priority(text: &str, domain: Domain, polarity: PriorityPolarity) -> Priority {
    let base = PRIORITY_RULES
        .iter()
        .find(|(markers, _)| first_hit(text, markers).is_some())
        .map(|(_, value)| *value)
        .unwrap_or(BASE_PRIORITY);

    let canonical = Priority::clamped(base - domain.priority_boost() as i64);
    Priority::from_urgency(canonical.urgency(PriorityPolarity::LowerIsUrgent), polarity)
}

fn estimate_minutes(text: &str, domain: Domain) -> i64 {
    if let Some(explicit) = explicit_minutes(text) {
        return explicit.clamp(MIN_TASK_MINUTES, MAX_TASK_MINUTES);
    }

    let base = domain.base_minutes();
    let adjusted = DURATION_RULES
        .iter()
        .find(|(markers, _)| first_hit(text, markers).is_some())
        .map(|(_, adjust)| adjust.apply(base))
        .unwrap_or(base);

    adjusted.clamp(MIN_TASK_MINUTES, MAX_TASK_MINUTES)
}

/// Minutes stated literally in the text, if any.
pub fn explicit_minutes(text: &str) -> Option<i64> {
    let caps = RE_DURATION.captures(text)?;
    let num: f64 = caps["num"].parse().ok()?;
    let unit = caps["unit"].to_lowercase();
    let minutes = if unit == "小时" || unit.starts_with('h') {
        num * 60.0
    } else {
        num
    };
    Some(minutes.round() as i64)
}

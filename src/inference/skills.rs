//! Rule-based skill-gap analysis

use crate::preprocessing::StudentRecord;
use serde::{Deserialize, Serialize};

const ACADEMIC_TARGET: f64 = 70.0;
const MBA_TARGET: f64 = 60.0;
const ETEST_TARGET: f64 = 70.0;

/// Urgency of a gap or of the overall improvement potential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One area where the profile falls short of its target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillGap {
    pub area: String,
    pub current: String,
    pub target: String,
    pub priority: Priority,
}

impl SkillGap {
    fn new(area: &str, current: String, target: &str, priority: Priority) -> Self {
        Self {
            area: area.to_string(),
            current,
            target: target.to_string(),
            priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAnalysis {
    pub skill_gaps: Vec<SkillGap>,
    pub recommendations: Vec<String>,
    /// Academic average of the profile
    pub overall_score: f64,
    pub improvement_potential: Priority,
}

/// Compare a profile with fixed targets and collect recommendations.
///
/// `placement_probability` below 0.5 adds general advice on top of the
/// per-gap recommendations.
pub fn analyze_skill_gaps(record: &StudentRecord, placement_probability: f64) -> SkillAnalysis {
    let mut skill_gaps = Vec::new();
    let mut recommendations = Vec::new();

    let avg = record.academic_average();
    if avg < ACADEMIC_TARGET {
        skill_gaps.push(SkillGap::new("Academic Performance", format!("{:.1}%", avg), "70%+", Priority::High));
        recommendations.push("Focus on improving academic scores through consistent study habits".to_string());
    }

    if !record.has_work_experience() {
        skill_gaps.push(SkillGap::new("Work Experience", "None".to_string(), "Internship/Job", Priority::High));
        recommendations
            .push("Gain practical work experience through internships or part-time jobs".to_string());
    }

    if record.mba_p < MBA_TARGET {
        skill_gaps.push(SkillGap::new(
            "MBA Performance",
            format!("{:.1}%", record.mba_p),
            "60%+",
            Priority::Medium,
        ));
        recommendations.push("Improve MBA scores through focused preparation and practice".to_string());
    }

    if record.etest_p < ETEST_TARGET {
        skill_gaps.push(SkillGap::new(
            "Employability Test",
            format!("{:.1}%", record.etest_p),
            "70%+",
            Priority::Medium,
        ));
        recommendations.push("Enhance employability skills through aptitude test practice".to_string());
    }

    if placement_probability < 0.5 {
        recommendations.extend(
            [
                "Consider additional certifications in trending technologies",
                "Build a strong portfolio with real-world projects",
                "Participate in hackathons and coding competitions",
            ]
            .map(String::from),
        );
    }

    let improvement_potential = match skill_gaps.len() {
        0 => Priority::Low,
        1 | 2 => Priority::Medium,
        _ => Priority::High,
    };

    SkillAnalysis {
        skill_gaps,
        recommendations,
        overall_score: avg,
        improvement_potential,
    }
}

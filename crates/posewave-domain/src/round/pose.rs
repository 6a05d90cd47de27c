use rand::Rng;
use serde::{Deserialize, Serialize};

/// Target poses the classifier can recognize. Labels match the
/// `pose_class` strings the classifier service returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pose {
    TPose,
    Tree,
    Warrior,
    Chair,
    Cobra,
}

impl Pose {
    pub const ALL: [Pose; 5] = [
        Pose::TPose,
        Pose::Tree,
        Pose::Warrior,
        Pose::Chair,
        Pose::Cobra,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Pose::TPose => "tpose",
            Pose::Tree => "tree",
            Pose::Warrior => "warrior",
            Pose::Chair => "chair",
            Pose::Cobra => "cobra",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "tpose" => Some(Pose::TPose),
            "tree" => Some(Pose::Tree),
            "warrior" => Some(Pose::Warrior),
            "chair" => Some(Pose::Chair),
            "cobra" => Some(Pose::Cobra),
            _ => None,
        }
    }

    /// Pick a random pose, excluding an immediate repeat of the pose
    /// currently on screen.
    pub fn random_excluding<R: Rng>(rng: &mut R, exclude: Option<Pose>) -> Pose {
        let candidates: Vec<Pose> = Self::ALL
            .iter()
            .copied()
            .filter(|p| Some(*p) != exclude)
            .collect();
        candidates[rng.gen_range(0..candidates.len())]
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

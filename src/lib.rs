//! Mamdani fuzzy inference over plain-text knowledge bases.
//!
//! A knowledge base declares trapezoidal fuzzy variables, `If ... then ...`
//! rules and crisp measurements. Measured variables act as antecedents, the
//! rest as consequents; each consequent's aggregated curve is reduced to a
//! crisp value by both centroid and bisector.
//!
//! ```
//! use fuzzy_rulebase::{EngineConfig, KnowledgeBase, MamdaniInference};
//!
//! let kb = KnowledgeBase::parse("\
//! Temp
//! name c1 c2 w1 w2
//! Cold 0 10 0 10
//! Hot 30 40 10 0
//!
//! Fan
//! name c1 c2 w1 w2
//! Slow 0 20 0 20
//! Fast 80 100 20 0
//!
//! Rule1: If Temp is Cold then Fan is Slow
//! Rule2: If Temp is Hot then Fan is Fast
//!
//! Temp = 35
//! ")?;
//! let engine = MamdaniInference::from_knowledge_base(EngineConfig::default(), &kb)?;
//! let report = engine.eval(&kb.measurements)?;
//!
//! assert!(report.centroid("Fan").unwrap() > 50.);
//! # Ok::<(), fuzzy_rulebase::Error>(())
//! ```

mod arange;
mod classify;
pub mod defuzz;
mod dsl;
mod error;
mod inference;
mod inputs;
pub mod kb;
mod math;
pub mod membership;
mod ops;
mod outputs;
mod rules;
pub mod sampling;
mod terms;
mod variable;

pub use classify::{classify, ClassifiedVariable, VariableKind};
pub use error::{Error, Result};
pub use inference::{EngineConfig, MamdaniInference};
pub use inputs::Measurements;
pub use kb::KnowledgeBase;
pub use membership::VariableCurves;
pub use ops::{Connector, DefuzzificationOp};
pub use outputs::{Defuzzified, Fuzzified, InferenceReport, RuleActivation};
pub use rules::{Condition, Rule, Rules};
pub use terms::Terms;
pub use variable::{FuzzyVariable, Trapezoid, VariableKey, Variables};

//! Registry of automaton variants.
//!
//! Every variant is reachable by name through a [`VariantFactory`]. The
//! built-in set is assembled once and shared through [`registry()`].

use crate::automaton::{Automaton, AutomatonMetadata};
use crate::error::{Error, Result};
use crate::patterns::{PatternInfo, PatternParams};
use crate::rules::{BirthSurvival, RuleFile};
use crate::variants::{
    brians_brain, cyclic, elementary, langton, wireworld, BriansBrain, ConstructorFlavor, CyclicAutomaton,
    ElementaryAutomaton, LangtonLoop, LifeFlavor, LifeLike, VonNeumannConstructor, WireWorld,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Construction options shared by all factories.
///
/// Each factory reads only the fields that apply to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomatonOptions {
    /// Initial pattern; the variant's default when unset or unknown
    pub pattern: Option<String>,
    /// B/S rule string for `life_like`
    pub rule: Option<String>,
    /// Wolfram rule number for `elementary`
    pub rule_number: Option<u8>,
    /// State count for `cyclic_ca`
    pub num_states: Option<u8>,
    /// Advance threshold for `cyclic_ca`
    pub threshold: Option<u8>,
    /// JSON rule file loaded before the pattern is placed
    pub rule_file: Option<PathBuf>,
    pub params: PatternParams,
}

impl AutomatonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.pattern = Some(pattern.to_string());
        self
    }

    pub fn with_rule(mut self, rule: &str) -> Self {
        self.rule = Some(rule.to_string());
        self
    }

    pub fn with_rule_number(mut self, rule_number: u8) -> Self {
        self.rule_number = Some(rule_number);
        self
    }

    pub fn with_cyclic(mut self, num_states: u8, threshold: u8) -> Self {
        self.num_states = Some(num_states);
        self.threshold = Some(threshold);
        self
    }

    pub fn with_rule_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.rule_file = Some(path.into());
        self
    }

    pub fn with_params(mut self, params: PatternParams) -> Self {
        self.params = params;
        self
    }
}

/// Descriptive grouping used by listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    SelfReplicating,
    CircuitSimulation,
    LifeLike,
    WavePropagation,
    ElementaryCa,
    SelfOrganizing,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Self::SelfReplicating,
        Self::CircuitSimulation,
        Self::LifeLike,
        Self::WavePropagation,
        Self::ElementaryCa,
        Self::SelfOrganizing,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SelfReplicating => "Self-Replicating",
            Self::CircuitSimulation => "Circuit Simulation",
            Self::LifeLike => "Life-like",
            Self::WavePropagation => "Wave/Propagation",
            Self::ElementaryCa => "Elementary CA",
            Self::SelfOrganizing => "Self-Organizing",
        };
        f.write_str(label)
    }
}

/// Creates instances of one variant and describes it
pub trait VariantFactory: Send + Sync {
    /// Registry key, lowercase
    fn name(&self) -> &'static str;

    fn categories(&self) -> &'static [Category];

    fn metadata(&self) -> AutomatonMetadata;

    fn default_pattern(&self) -> &'static str;

    fn default_patterns(&self) -> Vec<PatternInfo>;

    fn colormap(&self) -> Vec<String>;

    /// Construct an empty automaton
    fn build(&self, width: usize, height: usize, options: &AutomatonOptions) -> Result<Box<dyn Automaton>>;

    /// Construct, load `rule_file` if given, then place the requested pattern
    fn create_automaton(&self, width: usize, height: usize, options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_parameter(
                "dimensions",
                format!("grid must be at least 1x1, got {}x{}", width, height),
            ));
        }

        let mut automaton = self.build(width, height, options)?;
        if let Some(path) = &options.rule_file {
            let rules = RuleFile::load(path)?;
            automaton.load_rules(&rules)?;
            log::info!("{}: loaded {} rules from {}", self.name(), rules.rule_count(), path.display());
        }

        let requested = options.pattern.as_deref().unwrap_or(self.default_pattern());
        let pattern = if self.default_patterns().iter().any(|p| p.name == requested) {
            requested
        } else {
            log::warn!(
                "{}: unknown pattern '{}', using '{}'",
                self.name(),
                requested,
                self.default_pattern()
            );
            self.default_pattern()
        };
        automaton.initialize_pattern(pattern, &options.params)?;

        log::debug!("created {} ({}x{}) with pattern '{}'", self.name(), width, height, pattern);
        Ok(automaton)
    }
}

struct LifeFactory {
    name: &'static str,
    flavor: LifeFlavor,
    categories: &'static [Category],
}

impl LifeFactory {
    fn rule(&self, options: &AutomatonOptions) -> Result<BirthSurvival> {
        match (self.flavor, &options.rule) {
            (LifeFlavor::Custom, Some(text)) => BirthSurvival::parse(text),
            _ => Ok(self.flavor.default_rule()),
        }
    }
}

impl VariantFactory for LifeFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn categories(&self) -> &'static [Category] {
        self.categories
    }

    fn metadata(&self) -> AutomatonMetadata {
        self.flavor.metadata(&self.flavor.default_rule())
    }

    fn default_pattern(&self) -> &'static str {
        self.flavor.default_pattern()
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        self.flavor.patterns()
    }

    fn colormap(&self) -> Vec<String> {
        self.flavor.colormap()
    }

    fn build(&self, width: usize, height: usize, options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        let rule = self.rule(options)?;
        Ok(Box::new(LifeLike::with_rule(width, height, self.flavor, rule)?))
    }
}

struct BriansBrainFactory;

impl VariantFactory for BriansBrainFactory {
    fn name(&self) -> &'static str {
        "brians_brain"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::WavePropagation]
    }

    fn metadata(&self) -> AutomatonMetadata {
        brians_brain::metadata()
    }

    fn default_pattern(&self) -> &'static str {
        brians_brain::DEFAULT_PATTERN
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        brians_brain::pattern_catalogue()
    }

    fn colormap(&self) -> Vec<String> {
        brians_brain::colormap()
    }

    fn build(&self, width: usize, height: usize, _options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        Ok(Box::new(BriansBrain::new(width, height)?))
    }
}

struct WireWorldFactory;

impl VariantFactory for WireWorldFactory {
    fn name(&self) -> &'static str {
        "wireworld"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::CircuitSimulation]
    }

    fn metadata(&self) -> AutomatonMetadata {
        wireworld::metadata()
    }

    fn default_pattern(&self) -> &'static str {
        wireworld::DEFAULT_PATTERN
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        wireworld::pattern_catalogue()
    }

    fn colormap(&self) -> Vec<String> {
        wireworld::colormap()
    }

    fn build(&self, width: usize, height: usize, _options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        Ok(Box::new(WireWorld::new(width, height)?))
    }
}

struct CyclicFactory;

impl VariantFactory for CyclicFactory {
    fn name(&self) -> &'static str {
        "cyclic_ca"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::SelfOrganizing]
    }

    fn metadata(&self) -> AutomatonMetadata {
        cyclic::metadata(cyclic::DEFAULT_STATES, cyclic::DEFAULT_THRESHOLD)
    }

    fn default_pattern(&self) -> &'static str {
        cyclic::DEFAULT_PATTERN
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        cyclic::pattern_catalogue()
    }

    fn colormap(&self) -> Vec<String> {
        cyclic::colormap()
    }

    fn build(&self, width: usize, height: usize, options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        Ok(Box::new(CyclicAutomaton::new(
            width,
            height,
            options.num_states.unwrap_or(cyclic::DEFAULT_STATES),
            options.threshold.unwrap_or(cyclic::DEFAULT_THRESHOLD),
        )?))
    }
}

/// Elementary automata. `rule` fixes the rule number; `None` reads it from
/// the options.
struct ElementaryFactory {
    name: &'static str,
    title: &'static str,
    description: &'static str,
    rule: Option<u8>,
    default_pattern: &'static str,
}

impl ElementaryFactory {
    const DEFAULT_RULE: u8 = 30;
}

impl VariantFactory for ElementaryFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::ElementaryCa]
    }

    fn metadata(&self) -> AutomatonMetadata {
        AutomatonMetadata::new(
            self.title,
            self.description,
            "Stephen Wolfram",
            2,
            crate::neighborhood::NeighborhoodKind::Custom,
        )
    }

    fn default_pattern(&self) -> &'static str {
        self.default_pattern
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        elementary::pattern_catalogue()
    }

    fn colormap(&self) -> Vec<String> {
        vec!["#000000".to_string(), "#FFFFFF".to_string()]
    }

    fn build(&self, width: usize, height: usize, options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        let rule = self
            .rule
            .unwrap_or_else(|| options.rule_number.unwrap_or(Self::DEFAULT_RULE));
        let automaton = ElementaryAutomaton::new(width, height, rule)?.with_default_pattern(self.default_pattern);
        Ok(Box::new(automaton))
    }
}

struct LangtonFactory;

impl VariantFactory for LangtonFactory {
    fn name(&self) -> &'static str {
        "langton_loop"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::SelfReplicating]
    }

    fn metadata(&self) -> AutomatonMetadata {
        langton::metadata()
    }

    fn default_pattern(&self) -> &'static str {
        langton::DEFAULT_PATTERN
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        langton::pattern_catalogue()
    }

    fn colormap(&self) -> Vec<String> {
        langton::colormap()
    }

    fn build(&self, width: usize, height: usize, _options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        Ok(Box::new(LangtonLoop::new(width, height)?))
    }
}

struct VonNeumannFactory {
    name: &'static str,
    flavor: ConstructorFlavor,
}

impl VariantFactory for VonNeumannFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::SelfReplicating]
    }

    fn metadata(&self) -> AutomatonMetadata {
        self.flavor.metadata()
    }

    fn default_pattern(&self) -> &'static str {
        self.flavor.default_pattern()
    }

    fn default_patterns(&self) -> Vec<PatternInfo> {
        self.flavor.patterns()
    }

    fn colormap(&self) -> Vec<String> {
        self.flavor.colormap()
    }

    fn build(&self, width: usize, height: usize, _options: &AutomatonOptions) -> Result<Box<dyn Automaton>> {
        Ok(Box::new(VonNeumannConstructor::new(width, height, self.flavor)?))
    }
}

/// Name-ordered collection of factories
pub struct Registry {
    factories: Vec<Box<dyn VariantFactory>>,
}

impl Registry {
    pub fn new() -> Self {
        Self { factories: Vec::new() }
    }

    /// Every built-in variant
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(LangtonFactory));
        registry.register(Box::new(VonNeumannFactory {
            name: "von_neumann",
            flavor: ConstructorFlavor::Simplified,
        }));
        registry.register(Box::new(VonNeumannFactory {
            name: "von_neumann_full",
            flavor: ConstructorFlavor::Full,
        }));
        registry.register(Box::new(WireWorldFactory));
        registry.register(Box::new(LifeFactory {
            name: "game_of_life",
            flavor: LifeFlavor::Conway,
            categories: &[Category::LifeLike],
        }));
        registry.register(Box::new(LifeFactory {
            name: "highlife",
            flavor: LifeFlavor::HighLife,
            categories: &[Category::SelfReplicating, Category::LifeLike],
        }));
        registry.register(Box::new(LifeFactory {
            name: "day_and_night",
            flavor: LifeFlavor::DayAndNight,
            categories: &[Category::LifeLike],
        }));
        registry.register(Box::new(LifeFactory {
            name: "life_like",
            flavor: LifeFlavor::Custom,
            categories: &[Category::LifeLike],
        }));
        registry.register(Box::new(BriansBrainFactory));
        registry.register(Box::new(LifeFactory {
            name: "seeds",
            flavor: LifeFlavor::Seeds,
            categories: &[Category::WavePropagation],
        }));
        registry.register(Box::new(ElementaryFactory {
            name: "rule_30",
            title: "Rule 30 (Chaotic)",
            description: "Chaotic elementary CA - random number generation",
            rule: Some(30),
            default_pattern: "single_cell",
        }));
        registry.register(Box::new(ElementaryFactory {
            name: "rule_110",
            title: "Rule 110 (Turing Complete)",
            description: "Computationally universal elementary CA",
            rule: Some(110),
            default_pattern: "random",
        }));
        registry.register(Box::new(ElementaryFactory {
            name: "rule_90",
            title: "Rule 90 (Sierpinski)",
            description: "Generates Sierpinski triangle fractal",
            rule: Some(90),
            default_pattern: "single_cell",
        }));
        registry.register(Box::new(ElementaryFactory {
            name: "elementary",
            title: "Elementary Cellular Automata",
            description: "1D automaton rules (Wolfram)",
            rule: None,
            default_pattern: "single_cell",
        }));
        registry.register(Box::new(CyclicFactory));
        registry
    }

    /// Add a factory, replacing any existing one with the same name
    pub fn register(&mut self, factory: Box<dyn VariantFactory>) {
        let name = factory.name();
        match self.factories.iter().position(|f| f.name() == name) {
            Some(index) => self.factories[index] = factory,
            None => self.factories.push(factory),
        }
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Result<&dyn VariantFactory> {
        let key = name.trim().to_lowercase();
        self.factories
            .iter()
            .find(|f| f.name() == key)
            .map(|f| f.as_ref())
            .ok_or_else(|| Error::UnknownVariant(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn VariantFactory> {
        self.factories.iter().map(|f| f.as_ref())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Variant names in `category`. A variant may appear in several.
    pub fn in_category(&self, category: Category) -> Vec<&'static str> {
        self.factories
            .iter()
            .filter(|f| f.categories().contains(&category))
            .map(|f| f.name())
            .collect()
    }

    /// Non-empty categories with their members
    pub fn categories(&self) -> Vec<(Category, Vec<&'static str>)> {
        Category::ALL
            .iter()
            .map(|&c| (c, self.in_category(c)))
            .filter(|(_, names)| !names.is_empty())
            .collect()
    }

    pub fn create_automaton(
        &self,
        name: &str,
        width: usize,
        height: usize,
        options: &AutomatonOptions,
    ) -> Result<Box<dyn Automaton>> {
        self.get(name)?.create_automaton(width, height, options)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::builtin()
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Shared built-in registry
pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::builtin)
}

/// Create a built-in variant by name
pub fn create_automaton(
    name: &str,
    width: usize,
    height: usize,
    options: &AutomatonOptions,
) -> Result<Box<dyn Automaton>> {
    registry().create_automaton(name, width, height, options)
}

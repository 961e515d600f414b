use serde::{Deserialize, Serialize};

/// Which simplifications the compressor may apply.
///
/// Everything is enabled by default. Use [`CompressOptions::conservative`]
/// to start from nothing, or [`CompressOptions::from_skip_list`] to disable
/// options by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    /// Join consecutive expression statements with the comma operator.
    pub sequences: bool,
    /// Rewrite `a["foo"]` to `a.foo`.
    pub properties: bool,
    /// Drop statements after an unconditional jump.
    pub dead_code: bool,
    pub drop_debugger: bool,
    /// Reserved for rewrites that may change behavior on unusual programs.
    #[serde(rename = "unsafe")]
    pub unsafe_: bool,
    /// Simplify `if` and `?:`.
    pub conditionals: bool,
    /// Flip relational operators when negating (`!(a < b)` to `a >= b`).
    pub comparations: bool,
    /// Fold constant expressions.
    pub evaluate: bool,
    /// Boolean-context rewrites and short boolean literals.
    pub booleans: bool,
    /// Simplify `while`/`do` loops with constant conditions.
    pub dwloops: bool,
    pub hoist_funs: bool,
    pub hoist_vars: bool,
    pub warnings: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            sequences: true,
            properties: true,
            dead_code: true,
            drop_debugger: true,
            unsafe_: true,
            conditionals: true,
            comparations: true,
            evaluate: true,
            booleans: true,
            dwloops: true,
            hoist_funs: true,
            hoist_vars: true,
            warnings: true,
        }
    }
}

/// Option names, one per field of [`CompressOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompressOption {
    Sequences,
    Properties,
    DeadCode,
    DropDebugger,
    Unsafe,
    Conditionals,
    Comparations,
    Evaluate,
    Booleans,
    Dwloops,
    HoistFuns,
    HoistVars,
    Warnings,
}

impl CompressOption {
    pub const ALL: [CompressOption; 13] = [
        CompressOption::Sequences,
        CompressOption::Properties,
        CompressOption::DeadCode,
        CompressOption::DropDebugger,
        CompressOption::Unsafe,
        CompressOption::Conditionals,
        CompressOption::Comparations,
        CompressOption::Evaluate,
        CompressOption::Booleans,
        CompressOption::Dwloops,
        CompressOption::HoistFuns,
        CompressOption::HoistVars,
        CompressOption::Warnings,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CompressOption::Sequences => "sequences",
            CompressOption::Properties => "properties",
            CompressOption::DeadCode => "dead_code",
            CompressOption::DropDebugger => "drop_debugger",
            CompressOption::Unsafe => "unsafe",
            CompressOption::Conditionals => "conditionals",
            CompressOption::Comparations => "comparations",
            CompressOption::Evaluate => "evaluate",
            CompressOption::Booleans => "booleans",
            CompressOption::Dwloops => "dwloops",
            CompressOption::HoistFuns => "hoist_funs",
            CompressOption::HoistVars => "hoist_vars",
            CompressOption::Warnings => "warnings",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|opt| opt.name() == name)
    }
}

impl CompressOptions {
    /// Every simplification off; warnings stay on.
    pub fn conservative() -> Self {
        Self {
            sequences: false,
            properties: false,
            dead_code: false,
            drop_debugger: false,
            unsafe_: false,
            conditionals: false,
            comparations: false,
            evaluate: false,
            booleans: false,
            dwloops: false,
            hoist_funs: false,
            hoist_vars: false,
            warnings: true,
        }
    }

    /// Defaults with the named options disabled. Unknown names are ignored.
    pub fn from_skip_list(skip: &[&str]) -> Self {
        let mut options = Self::default();
        for name in skip {
            if let Some(opt) = CompressOption::from_name(name) {
                options.set(opt, false);
            }
        }
        options
    }

    pub fn get(&self, option: CompressOption) -> bool {
        match option {
            CompressOption::Sequences => self.sequences,
            CompressOption::Properties => self.properties,
            CompressOption::DeadCode => self.dead_code,
            CompressOption::DropDebugger => self.drop_debugger,
            CompressOption::Unsafe => self.unsafe_,
            CompressOption::Conditionals => self.conditionals,
            CompressOption::Comparations => self.comparations,
            CompressOption::Evaluate => self.evaluate,
            CompressOption::Booleans => self.booleans,
            CompressOption::Dwloops => self.dwloops,
            CompressOption::HoistFuns => self.hoist_funs,
            CompressOption::HoistVars => self.hoist_vars,
            CompressOption::Warnings => self.warnings,
        }
    }

    pub fn set(&mut self, option: CompressOption, value: bool) {
        let field = match option {
            CompressOption::Sequences => &mut self.sequences,
            CompressOption::Properties => &mut self.properties,
            CompressOption::DeadCode => &mut self.dead_code,
            CompressOption::DropDebugger => &mut self.drop_debugger,
            CompressOption::Unsafe => &mut self.unsafe_,
            CompressOption::Conditionals => &mut self.conditionals,
            CompressOption::Comparations => &mut self.comparations,
            CompressOption::Evaluate => &mut self.evaluate,
            CompressOption::Booleans => &mut self.booleans,
            CompressOption::Dwloops => &mut self.dwloops,
            CompressOption::HoistFuns => &mut self.hoist_funs,
            CompressOption::HoistVars => &mut self.hoist_vars,
            CompressOption::Warnings => &mut self.warnings,
        };
        *field = value;
    }
}

//! Driver expressions and variable bindings.
//!
//! Only three expression shapes are ever generated, so expressions are a
//! closed enum rather than free-form text. The text form is produced when a
//! driver is handed to the host.

use serde::{Deserialize, Serialize};

use crate::error::ParamsError;
use crate::spring::SpringProperty;

/// Address of a custom property stored on a pose bone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyPath {
    /// Owning pose bone.
    pub bone: String,
    /// Custom property name.
    pub property: String,
}

impl PropertyPath {
    /// Creates a new property path.
    pub fn new(bone: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            bone: bone.into(),
            property: property.into(),
        }
    }

    /// Returns the data path relative to the armature object.
    pub fn data_path(&self) -> String {
        format!("pose.bones[\"{}\"][\"{}\"]", self.bone, self.property)
    }
}

/// A named driver variable reading a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverVariable {
    /// Variable name used in the expression.
    pub name: String,
    /// Property the variable reads.
    pub source: PropertyPath,
}

impl DriverVariable {
    /// Creates a new driver variable.
    pub fn new(name: impl Into<String>, source: PropertyPath) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }
}

/// The closed set of driver expression shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverExpr {
    /// `var`
    Identity { var: String },
    /// `var * factor`
    Product { var: String, factor: String },
    /// `1 - var`
    Complement { var: String },
}

impl DriverExpr {
    /// Returns the scripted expression text.
    pub fn expression(&self) -> String {
        match self {
            DriverExpr::Identity { var } => var.clone(),
            DriverExpr::Product { var, factor } => format!("{var} * {factor}"),
            DriverExpr::Complement { var } => format!("1 - {var}"),
        }
    }

    /// Returns the variable names referenced by the expression.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            DriverExpr::Identity { var } | DriverExpr::Complement { var } => vec![var.as_str()],
            DriverExpr::Product { var, factor } => vec![var.as_str(), factor.as_str()],
        }
    }

    /// Evaluates the expression, resolving variables through `resolve`.
    ///
    /// Returns `None` when any variable cannot be resolved.
    pub fn evaluate(&self, resolve: impl Fn(&str) -> Option<f64>) -> Option<f64> {
        match self {
            DriverExpr::Identity { var } => resolve(var.as_str()),
            DriverExpr::Product { var, factor } => {
                Some(resolve(var.as_str())? * resolve(factor.as_str())?)
            }
            DriverExpr::Complement { var } => Some(1.0 - resolve(var.as_str())?),
        }
    }
}

/// A scripted driver: an expression plus its variable bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// The expression.
    pub expr: DriverExpr,
    /// Bindings for every variable in the expression.
    pub variables: Vec<DriverVariable>,
}

impl Driver {
    /// Single-variable passthrough, the variable named after the property.
    pub fn passthrough(source: PropertyPath) -> Self {
        let name = source.property.clone();
        Self {
            expr: DriverExpr::Identity { var: name.clone() },
            variables: vec![DriverVariable::new(name, source)],
        }
    }

    /// `1 - x`, the variable named after the property.
    pub fn complement(source: PropertyPath) -> Self {
        let name = source.property.clone();
        Self {
            expr: DriverExpr::Complement { var: name.clone() },
            variables: vec![DriverVariable::new(name, source)],
        }
    }

    /// Global knob passthrough bound as `var`.
    pub fn global(source: PropertyPath) -> Self {
        Self {
            expr: DriverExpr::Identity {
                var: "var".to_string(),
            },
            variables: vec![DriverVariable::new("var", source)],
        }
    }

    /// `var * factor`: a global knob scaled by a per-instance factor.
    pub fn scaled(source: PropertyPath, factor: PropertyPath) -> Self {
        Self {
            expr: DriverExpr::Product {
                var: "var".to_string(),
                factor: "factor".to_string(),
            },
            variables: vec![
                DriverVariable::new("var", source),
                DriverVariable::new("factor", factor),
            ],
        }
    }

    /// Returns the binding for a variable name.
    pub fn variable(&self, name: &str) -> Option<&DriverVariable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Checks that every expression variable is bound.
    pub fn validate(&self) -> Result<(), ParamsError> {
        for name in self.expr.variables() {
            if self.variable(name).is_none() {
                return Err(ParamsError::UnboundDriverVariable(name.to_string()));
            }
        }
        Ok(())
    }
}

/// The driven attribute of a bone constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DriverTarget {
    /// The constraint's influence.
    Influence { constraint: String },
    /// A parameter of a spring constraint.
    SpringParam {
        constraint: String,
        property: SpringProperty,
    },
}

impl DriverTarget {
    /// Returns the name of the driven constraint.
    pub fn constraint(&self) -> &str {
        match self {
            DriverTarget::Influence { constraint } => constraint,
            DriverTarget::SpringParam { constraint, .. } => constraint,
        }
    }

    /// Returns the data path of the driven attribute, relative to its pose bone.
    pub fn data_path(&self) -> String {
        match self {
            DriverTarget::Influence { constraint } => {
                format!("constraints[\"{constraint}\"].influence")
            }
            DriverTarget::SpringParam {
                constraint,
                property,
            } => format!("constraints[\"{constraint}\"].{}", property.attribute()),
        }
    }
}

//! UI script emitter.
//!
//! The script is Python consumed by the host's panel layer. It is assembled
//! from the final lookup table and bone lists, independent of the order in
//! which constraints were created. Bone lists and the lookup are rendered as
//! Python literals. Display names are looked up in `spring_names`, built from
//! each spring bone's identity rather than parsed out of its host name.

use springchain_spec::constraint::SPRING;
use springchain_spec::{SpringProperty, FOLLOW_SPRING_KNOB};

use crate::chain::DerivedChain;
use crate::wiring::SpringLookup;

const INDENT: &str = "    ";

/// Line-oriented text builder with indentation.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    out: String,
    depth: usize,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one line at the current depth.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
        self
    }

    /// Writes an empty line.
    pub fn blank(&mut self) -> &mut Self {
        self.out.push('\n');
        self
    }

    /// Writes `header` and then the lines of `body` one level deeper.
    pub fn block(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.line(header);
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Renders a string as a single-quoted Python literal.
pub fn py_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders a string as a double-quoted Python literal.
fn py_dquote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Renders a list of names as a Python list literal.
pub fn py_list<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<String> = items.iter().map(|s| py_str(s.as_ref())).collect();
    format!("[{}]", items.join(", "))
}

/// Renders string pairs as a Python dict literal.
pub fn py_dict<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let entries: Vec<String> = entries
        .into_iter()
        .map(|(k, v)| format!("{}: {}", py_str(k), py_str(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn selected_spring(w: &mut ScriptWriter, label: &str, body: impl FnOnce(&mut ScriptWriter)) {
    w.block("for b in control_bones + preview_bones:", |w| {
        w.block("if is_selected([b, ]):", |w| {
            w.line("spring = lookup[b]");
            w.line("name = spring_names[spring]");
            w.line(format!("layout.label(text=\"{label} for '%s'\" % name)"));
            body(w);
        });
    });
}

/// Emits the panel script for one rig.
pub fn emit_ui_script(
    prop_bone: &str,
    lookup: &SpringLookup,
    control_bones: &[String],
    preview_bones: &[String],
    spring_bones: &DerivedChain,
    unify: bool,
) -> String {
    let mut w = ScriptWriter::new();
    w.line(format!("prop_bone = {}", py_dquote(prop_bone)));
    w.line(format!("lookup = {}", py_dict(lookup.iter())));
    w.line(format!("control_bones = {}", py_list(control_bones)));
    w.line(format!("preview_bones = {}", py_list(preview_bones)));
    w.line(format!("spring_bones = {}", py_list(&spring_bones.names())));
    w.line(format!("spring_names = {}", py_dict(spring_bones.display_names())));
    w.blank();

    w.block("if is_selected(control_bones + preview_bones):", |w| {
        w.line(format!(
            "layout.prop(pose_bones[prop_bone], '[\"{FOLLOW_SPRING_KNOB}\"]', text=\"Follow spring\")"
        ));
        w.blank();

        if unify {
            w.line("# Shared spring properties");
            w.line("layout.label(text=\"Spring properties\")");
            for property in SpringProperty::ALL {
                w.line(format!(
                    "layout.prop(pose_bones[prop_bone], '[\"{}\"]', text=\"{}\")",
                    property.global_knob(),
                    property.label()
                ));
            }
            w.blank();
            w.line("# Per-spring factors");
            selected_spring(w, "Spring factors", |w| {
                for property in SpringProperty::tweakable() {
                    if let Some(knob) = property.factor_knob() {
                        w.line(format!(
                            "layout.prop(pose_bones[spring], '[\"{knob}\"]', text=\"{} factor\")",
                            property.label()
                        ));
                    }
                }
            });
        } else {
            w.line("# Spring properties");
            selected_spring(w, "Spring properties", |w| {
                for property in SpringProperty::ALL {
                    w.line(format!(
                        "layout.prop(pose_bones[spring].constraints[\"{SPRING}\"], '{}')",
                        property.attribute()
                    ));
                }
            });
        }
    });
    w.finish()
}

//! Page compiler pipeline.
//!
//! Orchestrates one page compilation in four strictly ordered phases:
//! 1. Collect: resolve each widget's plugin and gather its resource requests
//! 2. Shared declarations: one call per kind, in first-seen-kind order
//! 3. Per-widget emission: procedural instructions or declarative subtrees
//! 4. Bundle: freeze buffers and declarations into one output artifact

use dashgen_types::{
    DeviceProfile, Diagnostic, DiagnosticCode, OutputTarget, Page, Props, Severity, Widget,
};

use crate::bundle::{Bundle, TargetOutput};
use crate::context::EmitContext;
use crate::declarative;
use crate::error::{CodegenError, CodegenResult};
use crate::instr::Program;
use crate::options::CompileOptions;
use crate::plugin::{PluginRegistry, WidgetPlugin};
use crate::procedural;
use crate::trace::TraceRecord;
use crate::tree::Node;

// ══════════════════════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════════════════════

/// Compile one page for a profile.
///
/// Data problems (unknown kinds, malformed props, missing sensors) become
/// diagnostics in the bundle. An `Err` means a plugin broke an invariant.
pub fn compile(
    page: &Page,
    profile: &DeviceProfile,
    registry: &PluginRegistry,
    options: &CompileOptions,
) -> CodegenResult<Bundle> {
    Pipeline::new(page, profile, registry, options, &[]).run()
}

/// [`compile`] a page that shares one id namespace with other pages.
///
/// `reserved` holds the node ids of pages compiled before this one; the
/// page's declarative nodes never reuse them.
pub fn compile_reserving(
    page: &Page,
    profile: &DeviceProfile,
    registry: &PluginRegistry,
    options: &CompileOptions,
    reserved: &[String],
) -> CodegenResult<Bundle> {
    Pipeline::new(page, profile, registry, options, reserved).run()
}

// ══════════════════════════════════════════════════════════════════════════════
// Pipeline
// ══════════════════════════════════════════════════════════════════════════════

/// Where a widget is in its treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Treatment {
    Unvisited,
    RequirementsCollected,
    Emitted,
    /// No plugin for the kind; never emitted.
    Skipped,
}

struct Slot<'r> {
    plugin: Option<&'r dyn WidgetPlugin>,
    resolved: Props,
    state: Treatment,
}

struct Pipeline<'a> {
    page: &'a Page,
    profile: &'a DeviceProfile,
    registry: &'a PluginRegistry,
    ctx: EmitContext<'a>,
    slots: Vec<Slot<'a>>,
    reserved: &'a [String],
}

impl<'a> Pipeline<'a> {
    fn new(
        page: &'a Page,
        profile: &'a DeviceProfile,
        registry: &'a PluginRegistry,
        options: &'a CompileOptions,
        reserved: &'a [String],
    ) -> Self {
        let slots = page
            .widgets
            .iter()
            .map(|_| Slot {
                plugin: None,
                resolved: Props::new(),
                state: Treatment::Unvisited,
            })
            .collect();
        Self {
            page,
            profile,
            registry,
            ctx: EmitContext::new(profile, options),
            slots,
            reserved,
        }
    }

    fn run(mut self) -> CodegenResult<Bundle> {
        log::debug!(
            "compiling page '{}' ({} widgets) for {}",
            self.page.id,
            self.page.widgets.len(),
            self.profile.name
        );

        // 1. Collect
        self.collect();

        // 2. Shared declarations
        self.emit_shared();

        // 3. Per-widget emission
        let output = match self.profile.target {
            OutputTarget::Procedural => TargetOutput::Procedural(self.emit_procedural()?),
            OutputTarget::Declarative => TargetOutput::Declarative(self.emit_declarative()?),
        };

        // 4. Bundle
        let options = self.ctx.options();
        let declarations = self.ctx.resources.declarations(&options.icon_font_file);
        log::debug!(
            "page '{}': {} declarations, {} diagnostics",
            self.page.id,
            declarations.len(),
            self.ctx.diagnostics.len()
        );
        let node_ids = self.ctx.node_ids().to_vec();
        Ok(Bundle {
            page_id: self.page.id.clone(),
            page_name: self.page.name.clone(),
            output,
            declarations,
            diagnostics: self.ctx.diagnostics,
            display_id: self.profile.display_id.clone(),
            trace_comments: options.trace_comments,
            node_ids,
        })
    }

    // ── Phase 1 ──────────────────────────────────────────────────────────

    fn collect(&mut self) {
        let page = self.page;
        let registry = self.registry;
        for (widget, slot) in page.widgets.iter().zip(self.slots.iter_mut()) {
            let Some(plugin) = registry.lookup(&widget.kind) else {
                self.ctx.diagnose(
                    Diagnostic::new(
                        DiagnosticCode::UNKNOWN_WIDGET_KIND,
                        format!("unknown widget kind '{}'; widget skipped", widget.kind),
                    )
                    .for_widget(&widget.id),
                );
                slot.state = Treatment::Skipped;
                continue;
            };

            let resolved = widget.props.resolve(plugin.props());
            if !resolved.malformed.is_empty() {
                self.ctx.diagnose(
                    Diagnostic::new(
                        DiagnosticCode::MALFORMED_PROPERTY,
                        format!(
                            "malformed {}; default used",
                            resolved.malformed.join(", ")
                        ),
                    )
                    .for_widget(&widget.id)
                    .with_severity(Severity::Info),
                );
            }

            if let Some(condition) = &widget.condition {
                for entity in condition.entities() {
                    self.ctx.entity(entity);
                }
            }
            plugin.collect_requirements(widget, &mut self.ctx);

            slot.plugin = Some(plugin);
            slot.resolved = resolved.props;
            slot.state = Treatment::RequirementsCollected;
        }
    }

    // ── Phase 2 ──────────────────────────────────────────────────────────

    fn emit_shared(&mut self) {
        let page = self.page;
        let registry = self.registry;
        let mut kinds: Vec<&str> = Vec::new();
        for (widget, slot) in page.widgets.iter().zip(&self.slots) {
            if slot.plugin.is_some() && !kinds.contains(&widget.kind.as_str()) {
                kinds.push(&widget.kind);
            }
        }
        for kind in kinds {
            let Some(plugin) = registry.lookup(kind) else {
                continue;
            };
            let widgets: Vec<&Widget> = page
                .widgets
                .iter()
                .zip(&self.slots)
                .filter(|(w, s)| w.kind == kind && s.plugin.is_some())
                .map(|(w, _)| w)
                .collect();
            plugin.emit_shared(&mut self.ctx, &widgets);
        }
    }

    // ── Phase 3 ──────────────────────────────────────────────────────────

    /// Plugin and trace record of a widget that is ready for emission.
    fn ready(&self, index: usize) -> CodegenResult<Option<(&'a dyn WidgetPlugin, TraceRecord)>> {
        let slot = &self.slots[index];
        match (slot.state, slot.plugin) {
            (Treatment::Skipped, _) => Ok(None),
            (Treatment::RequirementsCollected, Some(plugin)) => {
                let widget = &self.page.widgets[index];
                Ok(Some((plugin, TraceRecord::new(widget, slot.resolved.clone()))))
            }
            (state, _) => Err(CodegenError::Internal(format!(
                "widget '{}' reached emission in state {state:?}",
                self.page.widgets[index].id
            ))),
        }
    }

    fn emit_procedural(&mut self) -> CodegenResult<Program> {
        let page = self.page;
        for (index, widget) in page.widgets.iter().enumerate() {
            let Some((plugin, record)) = self.ready(index)? else {
                continue;
            };
            procedural::emit_widget(plugin, widget, record, &mut self.ctx)?;
            self.slots[index].state = Treatment::Emitted;
        }
        Ok(std::mem::take(&mut self.ctx.program))
    }

    fn emit_declarative(&mut self) -> CodegenResult<Node> {
        let page = self.page;
        let reserved: &'a [String] = self.reserved;
        let page_node = self
            .ctx
            .begin_page(&page.id, reserved.iter().map(String::as_str));
        let mut root = Node::new("page").ident("id", page_node);
        // Widget ids first, in page order, so sub-element ids never take them.
        for (widget, slot) in page.widgets.iter().zip(&self.slots) {
            if slot.state == Treatment::RequirementsCollected {
                self.ctx.node_id(widget);
            }
        }
        for (index, widget) in page.widgets.iter().enumerate() {
            let Some((plugin, record)) = self.ready(index)? else {
                continue;
            };
            match declarative::emit_widget(plugin, widget, record, &mut self.ctx) {
                Some(node) => root.children.push(node),
                None => self.ctx.diagnose(
                    Diagnostic::new(
                        DiagnosticCode::UNSUPPORTED_TARGET,
                        format!("'{}' has no declarative form; widget skipped", widget.kind),
                    )
                    .for_widget(&widget.id),
                ),
            }
            self.slots[index].state = Treatment::Emitted;
        }
        Ok(root)
    }
}

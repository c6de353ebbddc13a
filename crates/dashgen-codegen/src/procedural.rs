//! Procedural emission engine.
//!
//! Wraps each widget's drawing instructions in its trace marker and
//! visibility guard and checks that the plugin left its blocks balanced.

use dashgen_types::Widget;

use crate::context::EmitContext;
use crate::error::{CodegenError, CodegenResult};
use crate::instr::{check_balance, Instr};
use crate::plugin::WidgetPlugin;
use crate::trace::TraceRecord;

/// Emit one widget: marker, optional guard, drawing calls, guard close.
pub fn emit_widget(
    plugin: &dyn WidgetPlugin,
    widget: &Widget,
    record: TraceRecord,
    ctx: &mut EmitContext,
) -> CodegenResult<()> {
    let start = ctx.program.len();
    ctx.emit(Instr::Trace(record));

    let guard = ctx.guard(widget);
    if let Some(expr) = &guard {
        ctx.emit(Instr::VisibleIf(expr.clone()));
    }
    plugin.emit_procedural(widget, ctx);
    if guard.is_some() {
        ctx.emit(Instr::EndVisible);
    }

    check_balance(ctx.program.since(start)).map_err(|detail| CodegenError::UnbalancedBlocks {
        widget_id: widget.id.clone(),
        kind: widget.kind.clone(),
        detail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CompileOptions;
    use crate::plugin::PluginInfo;
    use dashgen_types::{CompareOp, Condition, DeviceProfile, Geometry, Props};

    struct Leaky;

    impl WidgetPlugin for Leaky {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                kind: "leaky",
                title: "Leaky",
                description: "",
                props: &[],
                shared: false,
                declarative: false,
            }
        }

        fn emit_procedural(&self, _widget: &Widget, ctx: &mut EmitContext) {
            ctx.emit(Instr::If("true".into()));
        }
    }

    struct Quiet;

    impl WidgetPlugin for Quiet {
        fn info(&self) -> PluginInfo {
            PluginInfo {
                kind: "quiet",
                ..Leaky.info()
            }
        }
    }

    #[test]
    fn unbalanced_plugin_is_an_error() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        let w = Widget::new("x", "leaky", Geometry::new(0, 0, 1, 1));
        let record = TraceRecord::new(&w, Props::new());
        let err = emit_widget(&Leaky, &w, record, &mut ctx).unwrap_err();
        assert!(matches!(err, CodegenError::UnbalancedBlocks { .. }));
    }

    #[test]
    fn guard_wraps_exactly_once() {
        let profile = DeviceProfile::builtin("reterminal_e1001").unwrap();
        let options = CompileOptions::default();
        let mut ctx = EmitContext::new(&profile, &options);
        ctx.entity("binary_sensor.door");
        let w = Widget::new("q", "quiet", Geometry::new(0, 0, 1, 1))
            .visible_when(Condition::state("binary_sensor.door", CompareOp::Eq, "on"));
        let record = TraceRecord::new(&w, Props::new());
        emit_widget(&Quiet, &w, record, &mut ctx).unwrap();
        let instrs = ctx.program.instrs();
        assert_eq!(instrs.len(), 3);
        assert!(matches!(instrs[0], Instr::Trace(_)));
        assert!(matches!(instrs[1], Instr::VisibleIf(_)));
        assert!(matches!(instrs[2], Instr::EndVisible));
    }
}

//! Renders compiled operations as JavaScript-like source text.
//!
//! The text mirrors the expression tree one to one: every object scope becomes an immediately
//! invoked closure, every async scope an awaited `async function`, every custom resolver a call
//! through `schema.getType(..).toConfig().fields`.
use std::fmt;

use serde::Serialize;

use crate::operation::CompiledArtifact;
use crate::operation::CompiledOperation;
use crate::operation::Expr;
use crate::operation::ObjectScope;
use crate::operation::PARAMETERS;
use crate::operation::Properties;
use crate::operation::ResolverCall;
use crate::resolver::ResolveInfo;

/// Writes source text, two spaces per nested block.
struct SourceWriter<'fmt, 'fmt2> {
    depth: usize,
    output: &'fmt mut fmt::Formatter<'fmt2>,
}

impl<'a, 'b> SourceWriter<'a, 'b> {
    fn new(output: &'a mut fmt::Formatter<'b>) -> Self {
        Self { depth: 0, output }
    }

    fn write<T: fmt::Display>(&mut self, text: T) -> fmt::Result {
        write!(self.output, "{text}")
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> fmt::Result {
        let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
        self.write(json)
    }

    fn new_line(&mut self) -> fmt::Result {
        self.write("\n")?;
        for _ in 0..self.depth {
            self.write("  ")?;
        }
        Ok(())
    }

    /// `open`, then `body` one level deeper on its own lines, then `close` back at this level.
    fn block(
        &mut self,
        open: impl fmt::Display,
        close: &str,
        body: impl FnOnce(&mut Self) -> fmt::Result,
    ) -> fmt::Result {
        self.write(open)?;
        self.depth += 1;
        self.new_line()?;
        body(self)?;
        self.depth -= 1;
        self.new_line()?;
        self.write(close)
    }

    /// Object literal with one property per line
    fn object(&mut self, properties: &Properties) -> fmt::Result {
        if properties.is_empty() {
            return self.write("{}");
        }
        self.block("{", "}", |writer| {
            for (index, (key, expr)) in properties.iter().enumerate() {
                if index > 0 {
                    writer.new_line()?;
                }
                writer.write(format_args!("{key}: "))?;
                writer.expr(expr)?;
                writer.write(",")?;
            }
            Ok(())
        })
    }

    fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::Property { source, key } => {
                self.write(format_args!("{source}["))?;
                self.write_json(key.as_str())?;
                self.write("]")
            }
            Expr::Literal(value) => self.write_json(value),
            Expr::Resolve(call) => self.call(call),
            Expr::Scope(scope) => self.scope(scope),
        }
    }

    fn call(&mut self, call: &ResolverCall) -> fmt::Result {
        if call.awaited {
            self.write("await ")?;
        }
        self.write("schema.getType(")?;
        self.write_json(call.coordinate.type_name.as_str())?;
        self.write(format_args!(
            ").toConfig().fields.{}.resolve({}, ",
            call.coordinate.field_name, call.source
        ))?;
        self.write_json(&call.arguments)?;
        self.write(", undefined, ")?;
        self.info(&call.info)?;
        self.write(")")
    }

    fn info(&mut self, info: &ResolveInfo) -> fmt::Result {
        if info.is_empty() {
            return self.write("{}");
        }
        self.write("{ fieldNodes: [")?;
        for (index, field) in info.field_nodes.iter().enumerate() {
            if index > 0 {
                self.write(", ")?;
            }
            self.write_json(&field.serialize().no_indent().to_string())?;
        }
        self.write("] }")
    }

    /// Immediately invoked closure binding the field's value, `null` when it is falsy.
    ///
    /// Only plain objects contribute their own properties to the merge.
    fn scope(&mut self, scope: &ObjectScope) -> fmt::Result {
        let binding = scope.binding;
        let open = if scope.is_async {
            "await (async function () {"
        } else {
            "(function () {"
        };
        self.block(open, "})()", |writer| {
            writer.write(format_args!("const {binding} = "))?;
            writer.expr(&scope.value)?;
            writer.write(";")?;
            writer.new_line()?;
            writer.block(format_args!("if ({binding}) {{"), "}", |writer| {
                writer.write(format_args!(
                    "return Object.assign({{}}, typeof {binding} === \"object\" \
                     && !Array.isArray({binding}) ? {binding} : {{}}, "
                ))?;
                writer.object(&scope.selection)?;
                writer.write(");")
            })?;
            writer.new_line()?;
            writer.write("return null;")
        })
    }

    fn operation(&mut self, operation: &CompiledOperation) -> fmt::Result {
        let keyword = if operation.is_async {
            "async function"
        } else {
            "function"
        };
        let open = format!(
            "({keyword} {}({}) {{",
            operation.name,
            PARAMETERS.join(", ")
        );
        self.block(open, "})", |writer| {
            writer.block("return {", "};", |writer| {
                writer.write("data: ")?;
                writer.object(&operation.data)?;
                writer.write(",")
            })
        })
    }
}

impl fmt::Display for CompiledOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        SourceWriter::new(f).operation(self)
    }
}

impl fmt::Display for CompiledArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let writer = &mut SourceWriter::new(f);
        for (index, operation) in self.operations().enumerate() {
            if index > 0 {
                writer.new_line()?;
                writer.new_line()?;
            }
            writer.operation(operation)?;
        }
        Ok(())
    }
}

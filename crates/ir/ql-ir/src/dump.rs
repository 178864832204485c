//! Textual rendering of a module
//!
//! One node per line, children indented two spaces deeper than their parent.
//! The format is stable enough for snapshot tests.

use crate::decl::{ClassKind, IrAnnotation, IrBody};
use crate::expr::{
    Intrinsic, IrBinaryOp, IrConst, IrExpr, IrStatement, IrValueRef, TypeOperator, VarargElement,
};
use crate::origin::IrOrigin;
use crate::ty::IrType;
use crate::{
    IrCall, IrClassId, IrDeclaration, IrFieldId, IrFunctionId, IrModule, IrPropertyId,
};
use ql_intern::Name;
use std::fmt::{self, Write};

/// `Display` adapter returned by [`IrModule::dump`]
pub struct ModuleDump<'a> {
    module: &'a IrModule,
}

impl<'a> ModuleDump<'a> {
    pub fn new(module: &'a IrModule) -> Self {
        Self { module }
    }
}

impl fmt::Display for ModuleDump<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut printer = Printer {
            module: self.module,
            out: formatter,
            indent: 0,
        };
        printer.line(format_args!("MODULE"))?;
        let module = self.module;
        printer.nested(|printer| {
            for declaration in &module.declarations {
                printer.declaration(*declaration)?;
            }
            Ok(())
        })
    }
}

struct Printer<'a> {
    module: &'a IrModule,
    out: &'a mut dyn Write,
    indent: usize,
}

impl<'a> Printer<'a> {
    fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        for _ in 0..self.indent {
            self.out.write_str("  ")?;
        }
        self.out.write_fmt(args)?;
        self.out.write_char('\n')
    }

    fn nested(&mut self, body: impl FnOnce(&mut Self) -> fmt::Result) -> fmt::Result {
        self.indent += 1;
        let result = body(self);
        self.indent -= 1;
        result
    }

    fn name(&self, name: Name) -> &'a str {
        self.module.name(name)
    }

    fn declaration(&mut self, declaration: IrDeclaration) -> fmt::Result {
        match declaration {
            IrDeclaration::Class(class) => self.class(class),
            IrDeclaration::Function(function) => self.function(function),
            IrDeclaration::Property(property) => self.property(property),
            IrDeclaration::Field(field) => self.field(field),
        }
    }

    fn class(&mut self, id: IrClassId) -> fmt::Result {
        let module = self.module;
        let class = &module.classes[id];
        let kind = match class.kind {
            ClassKind::Class => "CLASS",
            ClassKind::Interface => "INTERFACE",
            ClassKind::Enum => "ENUM_CLASS",
            ClassKind::Annotation => "ANNOTATION_CLASS",
            ClassKind::Object => "OBJECT",
        };
        let mut header = format!("CLASS {kind} {}", self.name(class.name));
        if class.is_data {
            header.push_str(" data");
        }
        if class.is_value {
            header.push_str(" value");
        }
        if !class.supertypes.is_empty() {
            let supertypes: Vec<String> = class
                .supertypes
                .iter()
                .map(|ty| self.type_name(ty))
                .collect();
            header.push_str(" : ");
            header.push_str(&supertypes.join(", "));
        }
        header.push_str(&origin_suffix(class.origin));
        self.line(format_args!("{header}"))?;
        self.nested(|printer| {
            printer.annotations(&class.annotations)?;
            for declaration in &class.declarations {
                printer.declaration(*declaration)?;
            }
            Ok(())
        })
    }

    fn function(&mut self, id: IrFunctionId) -> fmt::Result {
        let module = self.module;
        let function = &module.functions[id];
        let keyword = if function.kind.is_constructor() {
            "CONSTRUCTOR"
        } else {
            "FUN"
        };
        let parameters: Vec<String> = function
            .value_parameters
            .iter()
            .map(|param| {
                let param = &module.parameters[*param];
                let vararg = if param.is_vararg { "vararg " } else { "" };
                format!("{vararg}{}: {}", self.name(param.name), self.type_name(&param.ty))
            })
            .collect();
        let mut header = format!(
            "{keyword} {}({}): {}",
            self.name(function.name),
            parameters.join(", "),
            self.type_name(&function.return_type)
        );
        if function.kind.is_primary_constructor() {
            header.push_str(" primary");
        }
        if function.is_expect {
            header.push_str(" expect");
        }
        header.push_str(&origin_suffix(function.origin));
        self.line(format_args!("{header}"))?;
        self.nested(|printer| {
            printer.annotations(&function.annotations)?;
            for overridden in &function.overridden {
                let name = module.qualified_name(*overridden);
                printer.line(format_args!("overridden: {name}"))?;
            }
            for param in &function.value_parameters {
                let param = &module.parameters[*param];
                printer.annotations(&param.annotations)?;
                if let Some(default) = &param.default_value {
                    let name = printer.name(param.name);
                    printer.line(format_args!("DEFAULT {name}"))?;
                    printer.nested(|printer| printer.expr(default))?;
                }
            }
            match &function.body {
                Some(IrBody::Block(statements)) => {
                    printer.line(format_args!("BLOCK_BODY"))?;
                    printer.nested(|printer| {
                        for statement in statements {
                            printer.statement(statement)?;
                        }
                        Ok(())
                    })
                }
                Some(IrBody::Synthetic(kind)) => {
                    printer.line(format_args!("SYNTHETIC_BODY {kind}"))
                }
                None => Ok(()),
            }
        })
    }

    fn property(&mut self, id: IrPropertyId) -> fmt::Result {
        let module = self.module;
        let property = &module.properties[id];
        let keyword = if property.is_var { "var" } else { "val" };
        self.line(format_args!(
            "PROPERTY {keyword} {}{}",
            self.name(property.name),
            origin_suffix(property.origin)
        ))?;
        self.nested(|printer| {
            printer.annotations(&property.annotations)?;
            if let Some(field) = property.backing_field {
                printer.field(field)?;
            }
            if let Some(getter) = property.getter {
                printer.function(getter)?;
            }
            if let Some(setter) = property.setter {
                printer.function(setter)?;
            }
            Ok(())
        })
    }

    fn field(&mut self, id: IrFieldId) -> fmt::Result {
        let module = self.module;
        let field = &module.fields[id];
        self.line(format_args!(
            "FIELD {}: {}{}",
            self.name(field.name),
            self.type_name(&field.ty),
            origin_suffix(field.origin)
        ))?;
        self.nested(|printer| {
            printer.annotations(&field.annotations)?;
            if let Some(initializer) = &field.initializer {
                printer.line(format_args!("EXPRESSION_BODY"))?;
                printer.nested(|printer| printer.expr(initializer))?;
            }
            Ok(())
        })
    }

    fn annotations(&mut self, annotations: &[IrAnnotation]) -> fmt::Result {
        for annotation in annotations {
            let class = self.name(self.module.classes[annotation.class].name).to_owned();
            let arguments: Vec<String> = annotation
                .arguments
                .iter()
                .map(|(name, value)| format!("{}={}", self.name(*name), const_text(value)))
                .collect();
            if arguments.is_empty() {
                self.line(format_args!("ANNOTATION {class}"))?;
            } else {
                self.line(format_args!("ANNOTATION {class}({})", arguments.join(", ")))?;
            }
        }
        Ok(())
    }

    fn statement(&mut self, statement: &IrStatement) -> fmt::Result {
        match statement {
            IrStatement::Expr(expr) => self.expr(expr),
            IrStatement::Variable {
                variable,
                initializer,
            } => {
                let module = self.module;
                let variable = &module.variables[*variable];
                let keyword = if variable.is_var { "var" } else { "val" };
                self.line(format_args!(
                    "VAR {keyword} {}: {}",
                    self.name(variable.name),
                    self.type_name(&variable.ty)
                ))?;
                match initializer {
                    Some(initializer) => self.nested(|printer| printer.expr(initializer)),
                    None => Ok(()),
                }
            }
        }
    }

    fn expr(&mut self, expr: &IrExpr) -> fmt::Result {
        match expr {
            IrExpr::Const { value, .. } => self.line(format_args!("CONST {}", const_text(value))),
            IrExpr::GetValue { value, ty } => {
                let name = match value {
                    IrValueRef::Parameter(param) => {
                        self.name(self.module.parameters[*param].name).to_owned()
                    }
                    IrValueRef::Variable(variable) => {
                        self.name(self.module.variables[*variable].name).to_owned()
                    }
                    IrValueRef::This(_) => "<this>".to_owned(),
                };
                self.line(format_args!("GET_VAR {name}: {}", self.type_name(ty)))
            }
            IrExpr::GetField {
                receiver,
                field,
                ty,
            } => {
                self.line(format_args!(
                    "GET_FIELD {}: {}",
                    self.name(self.module.fields[*field].name),
                    self.type_name(ty)
                ))?;
                self.nested(|printer| printer.optional(receiver.as_deref()))
            }
            IrExpr::SetField {
                receiver,
                field,
                value,
            } => {
                self.line(format_args!(
                    "SET_FIELD {}",
                    self.name(self.module.fields[*field].name)
                ))?;
                self.nested(|printer| {
                    printer.optional(receiver.as_deref())?;
                    printer.expr(value)
                })
            }
            IrExpr::Call(call) => self.call("CALL", call),
            IrExpr::ConstructorCall(call) => self.call("CONSTRUCTOR_CALL", call),
            IrExpr::DelegatingConstructorCall(call) => {
                self.call("DELEGATING_CONSTRUCTOR_CALL", call)
            }
            IrExpr::EnumConstructorCall(call) => self.call("ENUM_CONSTRUCTOR_CALL", call),
            IrExpr::InstanceInitializerCall { class } => self.line(format_args!(
                "INSTANCE_INITIALIZER_CALL {}",
                self.name(self.module.classes[*class].name)
            )),
            IrExpr::Return { target, value } => {
                let target = self.module.qualified_name(*target);
                self.line(format_args!("RETURN from {target}"))?;
                self.nested(|printer| printer.expr(value))
            }
            IrExpr::Binary { op, lhs, rhs, ty } => {
                self.line(format_args!("BINARY {}: {}", op_name(*op), self.type_name(ty)))?;
                self.nested(|printer| {
                    printer.expr(lhs)?;
                    printer.expr(rhs)
                })
            }
            IrExpr::TypeOperator {
                op,
                operand,
                type_operand,
            } => {
                let op = match op {
                    TypeOperator::InstanceOf => "INSTANCEOF",
                    TypeOperator::NotInstanceOf => "NOT_INSTANCEOF",
                    TypeOperator::Cast => "CAST",
                };
                self.line(format_args!("TYPE_OP {op} {}", self.type_name(type_operand)))?;
                self.nested(|printer| printer.expr(operand))
            }
            IrExpr::If {
                condition,
                then_branch,
                else_branch,
                ty,
            } => {
                self.line(format_args!("IF: {}", self.type_name(ty)))?;
                self.nested(|printer| {
                    printer.expr(condition)?;
                    printer.expr(then_branch)?;
                    printer.optional(else_branch.as_deref())
                })
            }
            IrExpr::StringConcat(parts) => {
                self.line(format_args!("STRING_CONCAT"))?;
                self.nested(|printer| {
                    for part in parts {
                        printer.expr(part)?;
                    }
                    Ok(())
                })
            }
            IrExpr::Vararg {
                element_type,
                elements,
            } => {
                self.line(format_args!("VARARG {}", self.type_name(element_type)))?;
                self.nested(|printer| {
                    for element in elements {
                        match element {
                            VarargElement::Element(value) => printer.expr(value)?,
                            VarargElement::Spread(value) => {
                                printer.line(format_args!("SPREAD"))?;
                                printer.nested(|printer| printer.expr(value))?;
                            }
                        }
                    }
                    Ok(())
                })
            }
            IrExpr::Intrinsic { kind, argument } => {
                let kind = match kind {
                    Intrinsic::HashCode => "HASH_CODE",
                    Intrinsic::ToString => "TO_STRING",
                };
                self.line(format_args!("INTRINSIC {kind}"))?;
                self.nested(|printer| printer.expr(argument))
            }
            IrExpr::ErrorCall { description, ty } => self.line(format_args!(
                "ERROR_CALL {description:?}: {}",
                self.type_name(ty)
            )),
        }
    }

    fn optional(&mut self, expr: Option<&IrExpr>) -> fmt::Result {
        match expr {
            Some(expr) => self.expr(expr),
            None => Ok(()),
        }
    }

    fn call(&mut self, keyword: &str, call: &IrCall) -> fmt::Result {
        let callee = self.module.qualified_name(call.callee);
        let type_arguments = if call.type_arguments.is_empty() {
            String::new()
        } else {
            let arguments: Vec<String> = call
                .type_arguments
                .iter()
                .map(|argument| match argument {
                    Some(ty) => self.type_name(ty),
                    None => "_".to_owned(),
                })
                .collect();
            format!("<{}>", arguments.join(", "))
        };
        self.line(format_args!(
            "{keyword} {callee}{type_arguments}: {}",
            self.type_name(&call.ty)
        ))?;
        let parameters = self.module.functions[call.callee].value_parameters.clone();
        self.nested(|printer| {
            if let Some(receiver) = &call.dispatch_receiver {
                printer.line(format_args!("RECEIVER"))?;
                printer.nested(|printer| printer.expr(receiver))?;
            }
            for (index, argument) in call.arguments.iter().enumerate() {
                let Some(argument) = argument else {
                    continue;
                };
                let name = parameters.get(index).map_or_else(
                    || format!("#{index}"),
                    |param| printer.name(printer.module.parameters[*param].name).to_owned(),
                );
                printer.line(format_args!("ARG {name}"))?;
                printer.nested(|printer| printer.expr(argument))?;
            }
            Ok(())
        })
    }

    fn type_name(&self, ty: &IrType) -> String {
        match ty {
            IrType::Int => "Int".to_owned(),
            IrType::Boolean => "Boolean".to_owned(),
            IrType::String => "String".to_owned(),
            IrType::Unit => "Unit".to_owned(),
            IrType::Nothing => "Nothing".to_owned(),
            IrType::Any { nullable } => nullable_suffix("Any".to_owned(), *nullable),
            IrType::Class {
                class,
                arguments,
                nullable,
            } => {
                let mut name = self.name(self.module.classes[*class].name).to_owned();
                if !arguments.is_empty() {
                    let arguments: Vec<String> =
                        arguments.iter().map(|ty| self.type_name(ty)).collect();
                    name = format!("{name}<{}>", arguments.join(", "));
                }
                nullable_suffix(name, *nullable)
            }
            IrType::Array(element) => format!("Array<{}>", self.type_name(element)),
            IrType::TypeParameter(name) => self.name(*name).to_owned(),
            IrType::Error => "<error>".to_owned(),
        }
    }
}

fn nullable_suffix(mut name: String, nullable: bool) -> String {
    if nullable {
        name.push('?');
    }
    name
}

fn origin_suffix(origin: IrOrigin) -> String {
    match origin {
        IrOrigin::Defined => String::new(),
        origin => format!(" origin={origin}"),
    }
}

fn const_text(value: &IrConst) -> String {
    match value {
        IrConst::Int(value) => format!("Int {value}"),
        IrConst::Boolean(value) => format!("Boolean {value}"),
        IrConst::String(value) => format!("String {value:?}"),
        IrConst::Null => "Null".to_owned(),
        IrConst::Unit => "Unit".to_owned(),
    }
}

fn op_name(op: IrBinaryOp) -> &'static str {
    match op {
        IrBinaryOp::Add => "PLUS",
        IrBinaryOp::Sub => "MINUS",
        IrBinaryOp::Mul => "MUL",
        IrBinaryOp::EqEq => "EQEQ",
        IrBinaryOp::NotEq => "NOT_EQ",
        IrBinaryOp::Less => "LT",
        IrBinaryOp::Greater => "GT",
        IrBinaryOp::Identity => "EQEQEQ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::{FunctionKind, IrClass, IrFunction, IrParent, Visibility};
    use crate::expr::IrStatement;
    use expect_test::expect;
    use ql_intern::Interner;
    use ql_span::FileSpan;

    #[test]
    fn dumps_nested_declarations() {
        let mut module = IrModule::new(Interner::new());
        let name = module.interner.intern("Point");
        let class = module.classes.alloc(IrClass {
            name,
            kind: ClassKind::Class,
            visibility: Visibility::Public,
            is_data: false,
            is_value: false,
            parent: IrParent::Module,
            declarations: Vec::new(),
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            annotations: Vec::new(),
            origin: IrOrigin::Defined,
            span: FileSpan::default(),
        });
        module.add_declaration(IrParent::Module, IrDeclaration::Class(class));
        let init = module.interner.intern("<init>");
        let constructor = module.functions.alloc(IrFunction {
            name: init,
            kind: FunctionKind::Constructor { is_primary: true },
            visibility: Visibility::Public,
            origin: IrOrigin::Defined,
            parent: IrParent::Class(class),
            dispatch_receiver: None,
            type_parameters: Vec::new(),
            value_parameters: Vec::new(),
            return_type: module.this_type(class),
            body: Some(IrBody::Block(vec![IrStatement::Expr(
                IrExpr::InstanceInitializerCall { class },
            )])),
            overridden: Vec::new(),
            annotations: Vec::new(),
            is_expect: false,
            property: None,
            span: FileSpan::default(),
        });
        module.add_declaration(IrParent::Class(class), IrDeclaration::Function(constructor));

        expect![[r#"
            MODULE
              CLASS CLASS Point
                CONSTRUCTOR <init>(): Point primary
                  BLOCK_BODY
                    INSTANCE_INITIALIZER_CALL Point
        "#]]
        .assert_eq(&module.dump().to_string());
    }
}

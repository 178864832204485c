//! Expression and block conversion

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::storage::raw_index;
use ql_ir::{IrBinaryOp, IrCall, IrConst, IrExpr, IrStatement, IrType, IrValueRef, IrVariable};
use ql_typed::{BinaryOp, Block, ClassId, Constant, Expr, ExprId, Stmt, Type, ValueRef};
use tracing::debug;

pub(crate) fn lower_const(constant: &Constant) -> IrConst {
    match constant {
        Constant::Int(value) => IrConst::Int(*value),
        Constant::Boolean(value) => IrConst::Boolean(*value),
        Constant::String(value) => IrConst::String(value.clone()),
        Constant::Null => IrConst::Null,
        Constant::Unit => IrConst::Unit,
    }
}

fn lower_op(op: BinaryOp) -> IrBinaryOp {
    match op {
        BinaryOp::Add => IrBinaryOp::Add,
        BinaryOp::Sub => IrBinaryOp::Sub,
        BinaryOp::Mul => IrBinaryOp::Mul,
        BinaryOp::Eq => IrBinaryOp::EqEq,
        BinaryOp::NotEq => IrBinaryOp::NotEq,
        BinaryOp::Less => IrBinaryOp::Less,
        BinaryOp::Greater => IrBinaryOp::Greater,
    }
}

impl LoweringContext<'_> {
    pub fn lower_type(&self, ty: &Type) -> Result<IrType, LoweringError> {
        self.storage.lower_type(self.tree, ty)
    }

    pub fn lower_block(&mut self, block: &Block) -> Result<Vec<IrStatement>, LoweringError> {
        block
            .statements
            .iter()
            .map(|statement| self.lower_statement(statement))
            .collect()
    }

    pub fn lower_statement(&mut self, statement: &Stmt) -> Result<IrStatement, LoweringError> {
        match *statement {
            Stmt::Expr(expr) => Ok(IrStatement::Expr(self.lower_expr(expr)?)),
            Stmt::Local { local, initializer } => {
                // The initializer cannot see the variable it initializes
                let initializer = initializer.map(|expr| self.lower_expr(expr)).transpose()?;
                let typed = &self.tree.locals[local];
                let variable = IrVariable {
                    name: typed.name,
                    ty: self.lower_type(&typed.ty)?,
                    is_var: typed.is_var,
                };
                let variable = self.module.variables.alloc(variable);
                self.scopes
                    .bind(ValueRef::Local(local), IrValueRef::Variable(variable));
                Ok(IrStatement::Variable {
                    variable,
                    initializer,
                })
            }
        }
    }

    pub fn lower_expr(&mut self, expr: ExprId) -> Result<IrExpr, LoweringError> {
        let tree = self.tree;
        let lowered = match &tree.exprs[expr] {
            Expr::Const { value, ty } => IrExpr::Const {
                value: lower_const(value),
                ty: self.lower_type(ty)?,
            },
            Expr::GetValue(value) => {
                let Some(ir_value) = self.scopes.lookup(*value) else {
                    let name = match *value {
                        ValueRef::Parameter(param) => tree.parameters[param].name,
                        ValueRef::Local(local) => tree.locals[local].name,
                    };
                    return Err(LoweringError::UnboundValue {
                        name: self.name(name).to_owned(),
                    });
                };
                IrExpr::GetValue {
                    value: ir_value,
                    ty: self.lower_type(&tree.type_of(expr))?,
                }
            }
            Expr::This { class } => self.this_value(self.storage.class(*class)?),
            Expr::GetProperty { receiver, property } => {
                let typed = &tree.properties[*property];
                let ir_property = &self.module.properties[self.storage.property(*property)?];
                let (getter, field) = (ir_property.getter, ir_property.backing_field);
                let ty = self.lower_type(&typed.ty)?;
                let receiver = self.lower_receiver(*receiver, typed.owner)?;
                match (getter, field) {
                    (Some(getter), _) => {
                        let call = IrCall::new(getter, ty, 0, 0);
                        IrExpr::Call(match receiver {
                            Some(receiver) => call.with_receiver(receiver),
                            None => call,
                        })
                    }
                    (None, Some(field)) => IrExpr::GetField {
                        receiver: receiver.map(Box::new),
                        field,
                        ty,
                    },
                    (None, None) => {
                        return Err(LoweringError::MissingDeclaration {
                            kind: "property getter",
                            index: raw_index(*property),
                        });
                    }
                }
            }
            Expr::SetProperty {
                receiver,
                property,
                value,
            } => {
                let typed = &tree.properties[*property];
                let ir_property = &self.module.properties[self.storage.property(*property)?];
                let (setter, field) = (ir_property.setter, ir_property.backing_field);
                let receiver = self.lower_receiver(*receiver, typed.owner)?;
                let value = self.lower_expr(*value)?;
                match (setter, field) {
                    (Some(setter), _) => {
                        let mut call = IrCall::new(setter, IrType::Unit, 0, 1);
                        call.put_value_argument(0, value);
                        IrExpr::Call(match receiver {
                            Some(receiver) => call.with_receiver(receiver),
                            None => call,
                        })
                    }
                    (None, Some(field)) => IrExpr::SetField {
                        receiver: receiver.map(Box::new),
                        field,
                        value: Box::new(value),
                    },
                    (None, None) => {
                        return Err(LoweringError::MissingDeclaration {
                            kind: "property setter",
                            index: raw_index(*property),
                        });
                    }
                }
            }
            Expr::Call {
                function,
                receiver,
                arguments,
            } => {
                let typed = &tree.functions[*function];
                let mut call = IrCall::new(
                    self.storage.function(*function)?,
                    self.lower_type(&typed.return_type)?,
                    typed.type_parameters.len(),
                    typed.value_parameters.len(),
                );
                if let Some(receiver) = self.lower_receiver(*receiver, typed.owner)? {
                    call = call.with_receiver(receiver);
                }
                self.bind_arguments(&mut call, &typed.value_parameters, arguments)?;
                IrExpr::Call(call)
            }
            Expr::ConstructorCall {
                constructor,
                ty,
                arguments,
            } => {
                let typed = &tree.constructors[*constructor];
                let mut call = IrCall::new(
                    self.storage.constructor(*constructor)?,
                    self.lower_type(ty)?,
                    typed.type_parameters.len(),
                    typed.value_parameters.len(),
                );
                self.put_type_arguments(&mut call, ty)?;
                self.bind_arguments(&mut call, &typed.value_parameters, arguments)?;
                IrExpr::ConstructorCall(call)
            }
            Expr::Binary { op, lhs, rhs } => IrExpr::Binary {
                op: lower_op(*op),
                lhs: Box::new(self.lower_expr(*lhs)?),
                rhs: Box::new(self.lower_expr(*rhs)?),
                ty: self.lower_type(&tree.type_of(expr))?,
            },
            Expr::StringTemplate(parts) => IrExpr::StringConcat(
                parts
                    .iter()
                    .map(|part| self.lower_expr(*part))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Return(value) => {
                let target = self
                    .scopes
                    .current_function()
                    .ok_or(LoweringError::MissingReturnTarget)?;
                let value = match value {
                    Some(value) => self.lower_expr(*value)?,
                    None => IrExpr::unit(),
                };
                IrExpr::Return {
                    target,
                    value: Box::new(value),
                }
            }
            Expr::Error { message } => IrExpr::ErrorCall {
                description: message.clone(),
                ty: IrType::Error,
            },
        };
        Ok(lowered)
    }

    /// Explicit receiver, or `this` of the member's class when it is left implicit
    fn lower_receiver(
        &mut self,
        receiver: Option<ExprId>,
        owner: Option<ClassId>,
    ) -> Result<Option<IrExpr>, LoweringError> {
        match (receiver, owner) {
            (Some(receiver), _) => self.lower_expr(receiver).map(Some),
            (None, Some(owner)) => Ok(Some(self.this_value(self.storage.class(owner)?))),
            (None, None) => Ok(None),
        }
    }

    /// Copy the type arguments of `ty` onto `call`, up to the callee's type-parameter count
    pub(crate) fn put_type_arguments(
        &self,
        call: &mut IrCall,
        ty: &Type,
    ) -> Result<(), LoweringError> {
        let expanded = self.tree.expand_type(ty);
        for (index, argument) in expanded.arguments().iter().enumerate() {
            if !call.put_type_argument(index, self.lower_type(argument)?) {
                debug!(
                    callee = %self.module.qualified_name(call.callee),
                    index,
                    "dropping type argument past the callee's type parameters"
                );
            }
        }
        Ok(())
    }
}

//! Binding call-site arguments to callee parameters

use crate::context::LoweringContext;
use crate::error::LoweringError;
use ql_ir::{IrCall, IrExpr, VarargElement};
use ql_typed::{Argument, ParamId};

impl LoweringContext<'_> {
    /// Place `arguments` into the value-argument slots of `call`
    ///
    /// Named arguments go to the parameter with that name. Positional
    /// arguments fill parameters left to right, except that once they reach a
    /// `vararg` parameter every further positional argument becomes one of its
    /// elements. Slots nobody binds stay empty so the callee's default applies.
    pub fn bind_arguments(
        &mut self,
        call: &mut IrCall,
        parameters: &[ParamId],
        arguments: &[Argument],
    ) -> Result<(), LoweringError> {
        let tree = self.tree;
        let mut next_positional = 0;
        let mut varargs: Vec<(usize, Vec<VarargElement>)> = Vec::new();

        for (position, argument) in arguments.iter().enumerate() {
            let index = match argument.name {
                Some(name) => parameters
                    .iter()
                    .position(|param| tree.parameters[*param].name == name)
                    .ok_or_else(|| self.unknown_argument(call, self.name(name).to_owned()))?,
                None if next_positional < parameters.len() => next_positional,
                None => return Err(self.unknown_argument(call, format!("#{position}"))),
            };
            let value = self.lower_expr(argument.value)?;

            if tree.parameters[parameters[index]].is_vararg {
                let element = if argument.is_spread {
                    VarargElement::Spread(value)
                } else {
                    VarargElement::Element(value)
                };
                match varargs.iter_mut().find(|(slot, _)| *slot == index) {
                    Some((_, elements)) => elements.push(element),
                    None => varargs.push((index, vec![element])),
                }
            } else {
                call.put_value_argument(index, value);
                if argument.name.is_none() {
                    next_positional += 1;
                }
            }
        }

        for (index, elements) in varargs {
            let element_type = self.lower_type(&tree.parameters[parameters[index]].ty)?;
            call.put_value_argument(
                index,
                IrExpr::Vararg {
                    element_type,
                    elements,
                },
            );
        }
        Ok(())
    }

    fn unknown_argument(&self, call: &IrCall, argument: String) -> LoweringError {
        LoweringError::UnknownArgument {
            callee: self.module.qualified_name(call.callee),
            argument,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoweringOptions;
    use ql_ir::IrType;
    use ql_typed::{Expr, TreeBuilder, Type};

    struct Fixture {
        tree: ql_typed::TypedTree,
        function: ql_typed::FunctionId,
        parameters: Vec<ParamId>,
    }

    fn log_function() -> Fixture {
        let mut builder = TreeBuilder::new();
        let level = builder.param("level", Type::Int);
        let parts = builder.vararg_param("parts", Type::String);
        let parameters = vec![level, parts];
        let function = builder.function(None, "log", parameters.clone(), Type::Unit);
        Fixture {
            tree: builder.finish(),
            function,
            parameters,
        }
    }

    fn arguments(tree: &mut ql_typed::TypedTree, values: &[(Option<&str>, bool)]) -> Vec<Argument> {
        values
            .iter()
            .map(|(name, is_spread)| {
                let value = tree.exprs.alloc(Expr::Const {
                    value: ql_typed::Constant::Int(0),
                    ty: Type::Int,
                });
                Argument {
                    name: name.map(|name| tree.interner.intern(name)),
                    value,
                    is_spread: *is_spread,
                }
            })
            .collect()
    }

    #[test]
    fn positional_arguments_collect_into_the_vararg() {
        let mut fixture = log_function();
        let arguments = arguments(
            &mut fixture.tree,
            &[(None, false), (None, false), (None, true)],
        );
        let mut context = LoweringContext::new(&fixture.tree, LoweringOptions::default()).unwrap();
        let callee = context.storage.function(fixture.function).unwrap();
        let mut call = IrCall::new(callee, IrType::Unit, 0, 2);

        context
            .bind_arguments(&mut call, &fixture.parameters, &arguments)
            .unwrap();

        assert_eq!(call.arguments[0], Some(IrExpr::int(0)));
        let Some(IrExpr::Vararg {
            element_type,
            elements,
        }) = &call.arguments[1]
        else {
            panic!("expected a vararg, got {:?}", call.arguments[1]);
        };
        assert_eq!(*element_type, IrType::String);
        assert!(matches!(elements[0], VarargElement::Element(_)));
        assert!(matches!(elements[1], VarargElement::Spread(_)));
    }

    #[test]
    fn named_argument_leaves_other_slots_for_defaults() {
        let mut fixture = log_function();
        let arguments = arguments(&mut fixture.tree, &[(Some("level"), false)]);
        let mut context = LoweringContext::new(&fixture.tree, LoweringOptions::default()).unwrap();
        let callee = context.storage.function(fixture.function).unwrap();
        let mut call = IrCall::new(callee, IrType::Unit, 0, 2);

        context
            .bind_arguments(&mut call, &fixture.parameters, &arguments)
            .unwrap();

        assert_eq!(call.arguments, vec![Some(IrExpr::int(0)), None]);
    }

    #[test]
    fn unknown_name_is_reported_with_the_callee() {
        let mut fixture = log_function();
        let arguments = arguments(&mut fixture.tree, &[(Some("verbose"), false)]);
        let mut context = LoweringContext::new(&fixture.tree, LoweringOptions::default()).unwrap();
        let callee = context.storage.function(fixture.function).unwrap();
        let mut call = IrCall::new(callee, IrType::Unit, 0, 2);

        assert_eq!(
            context.bind_arguments(&mut call, &fixture.parameters, &arguments),
            Err(LoweringError::UnknownArgument {
                callee: "log".to_owned(),
                argument: "verbose".to_owned(),
            })
        );
    }
}

//! Copying annotations onto backend declarations

use crate::context::LoweringContext;
use crate::error::LoweringError;
use crate::expr::lower_const;
use ql_ir::{IrAnnotation, IrClassId, IrFieldId, IrFunctionId, IrParamId, IrPropertyId};
use ql_typed::{Annotation, AnnotationUseSite};

/// Backend declaration receiving annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationTarget {
    Class(IrClassId),
    Function(IrFunctionId),
    Property(IrPropertyId),
    Field(IrFieldId),
    Parameter(IrParamId),
}

impl AnnotationTarget {
    /// Use-site target that names this kind of declaration
    fn use_site(self) -> Option<AnnotationUseSite> {
        match self {
            Self::Property(_) => Some(AnnotationUseSite::Property),
            Self::Field(_) => Some(AnnotationUseSite::Field),
            Self::Parameter(_) => Some(AnnotationUseSite::Param),
            Self::Class(_) | Self::Function(_) => None,
        }
    }
}

impl LoweringContext<'_> {
    /// Copy annotations with no use-site target, or with the target's own one
    pub fn generate_annotations(
        &mut self,
        target: AnnotationTarget,
        annotations: &[Annotation],
    ) -> Result<(), LoweringError> {
        let own = target.use_site();
        self.project_annotations(target, annotations, |use_site| {
            use_site.is_none() || use_site == own
        })
    }

    /// Copy only annotations naming `use_site` explicitly (`@field:A`, `@get:A`)
    pub fn generate_use_site_annotations(
        &mut self,
        target: AnnotationTarget,
        annotations: &[Annotation],
        use_site: AnnotationUseSite,
    ) -> Result<(), LoweringError> {
        self.project_annotations(target, annotations, |site| site == Some(use_site))
    }

    fn project_annotations(
        &mut self,
        target: AnnotationTarget,
        annotations: &[Annotation],
        accepts: impl Fn(Option<AnnotationUseSite>) -> bool,
    ) -> Result<(), LoweringError> {
        let projected = annotations
            .iter()
            .filter(|annotation| accepts(annotation.use_site))
            .map(|annotation| self.lower_annotation(annotation))
            .collect::<Result<Vec<_>, _>>()?;
        if projected.is_empty() {
            return Ok(());
        }
        let slot = match target {
            AnnotationTarget::Class(class) => &mut self.module.classes[class].annotations,
            AnnotationTarget::Function(function) => {
                &mut self.module.functions[function].annotations
            }
            AnnotationTarget::Property(property) => {
                &mut self.module.properties[property].annotations
            }
            AnnotationTarget::Field(field) => &mut self.module.fields[field].annotations,
            AnnotationTarget::Parameter(param) => &mut self.module.parameters[param].annotations,
        };
        slot.extend(projected);
        Ok(())
    }

    fn lower_annotation(&self, annotation: &Annotation) -> Result<IrAnnotation, LoweringError> {
        Ok(IrAnnotation {
            class: self.storage.class(annotation.class)?,
            arguments: annotation
                .arguments
                .iter()
                .map(|(name, value)| (*name, lower_const(value)))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoweringOptions;
    use ql_typed::{ClassKind, Constant, TreeBuilder, Type};

    #[test]
    fn use_site_targets_select_the_declaration() {
        let mut builder = TreeBuilder::new();
        let marker = builder.class("Marker", ClassKind::Annotation);
        let holder = builder.class("Holder", ClassKind::Class);
        let value = builder.property(Some(holder), "value", Type::Int);
        let reason = builder.name("reason");
        builder.properties[value].annotations = vec![
            Annotation {
                class: marker,
                arguments: vec![(reason, Constant::String("plain".to_owned()))],
                use_site: None,
            },
            Annotation {
                class: marker,
                arguments: Vec::new(),
                use_site: Some(AnnotationUseSite::Field),
            },
        ];
        let tree = builder.finish();
        let mut context = LoweringContext::new(&tree, LoweringOptions::default()).unwrap();
        let property = context.storage.property(value).unwrap();
        let field = context.module.properties[property].backing_field.unwrap();
        let annotations = tree.properties[value].annotations.clone();

        context
            .generate_annotations(AnnotationTarget::Property(property), &annotations)
            .unwrap();
        context
            .generate_use_site_annotations(
                AnnotationTarget::Field(field),
                &annotations,
                AnnotationUseSite::Field,
            )
            .unwrap();

        let on_property = &context.module.properties[property].annotations;
        assert_eq!(on_property.len(), 1);
        assert_eq!(on_property[0].arguments.len(), 1);
        assert_eq!(context.module.fields[field].annotations.len(), 1);
        assert!(context.module.fields[field].annotations[0].arguments.is_empty());
    }
}

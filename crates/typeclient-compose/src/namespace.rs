use typeclient_core::{ControllerClassBuilder, MetaStore};

use crate::portal::Template;

/// Metadata key holding a controller class template.
pub const TEMPLATE: &str = "typeclient.compose.template";

/// Attaches a [`Template`] to a controller class declaration.
pub trait TemplateExt {
    fn template(self, template: Template) -> Self;
}

impl<T: 'static> TemplateExt for ControllerClassBuilder<T> {
    fn template(self, template: Template) -> Self {
        self.meta(TEMPLATE, Some(template))
    }
}

/// Template stored on a class metadata store, if any.
pub fn template_of(meta: &MetaStore) -> Option<Template> {
    meta.got::<Option<Template>>(TEMPLATE, None)
}

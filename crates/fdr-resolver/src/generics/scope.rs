use fdr_types::{ClassDescId, ClassParent, DescriptorStore, TypeParamId};
use smallvec::SmallVec;

/// Resolves type variable names to type parameters.
///
/// Scopes are pushed outermost first and searched innermost first, so a
/// method type parameter shadows a class type parameter of the same name.
#[derive(Clone, Debug, Default)]
pub struct TypeVariableResolver {
    scopes: SmallVec<[Vec<TypeParamId>; 2]>,
}

impl TypeVariableResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope of a class body: its own parameters and, for inner classes,
    /// those of every enclosing class that an instance captures.
    pub fn for_class(store: &DescriptorStore, class: ClassDescId) -> Self {
        let mut chain = vec![class];
        let mut current = class;
        while store.class(current).is_inner
            && let ClassParent::Class(outer) = store.class(current).parent
        {
            chain.push(outer);
            current = outer;
        }
        let mut resolver = Self::new();
        for &class in chain.iter().rev() {
            resolver.push(store.class(class).type_params.clone());
        }
        resolver
    }

    pub fn push(&mut self, params: Vec<TypeParamId>) {
        self.scopes.push(params);
    }

    pub fn resolve(&self, store: &DescriptorStore, name: &str) -> Option<TypeParamId> {
        self.scopes.iter().rev().find_map(|scope| {
            scope
                .iter()
                .copied()
                .find(|&p| store.name(store.type_param(p).name) == name)
        })
    }

    /// Every visible parameter, innermost scope first.
    pub fn visible(&self) -> impl Iterator<Item = TypeParamId> + '_ {
        self.scopes.iter().rev().flat_map(|scope| scope.iter().copied())
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

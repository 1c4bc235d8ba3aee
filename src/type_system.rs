//! The type universe annotations are drawn from.
//!
//! Types form a single-inheritance tree rooted at the built-in
//! [`ANNOTATION_TYPE_NAME`] type. Selecting a type selects the type and all
//! of its subtypes.

use crate::{SelectError, SelectResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

/// Name of the built-in root type every declared type descends from.
pub const ANNOTATION_TYPE_NAME: &str = "Annotation";

static NEXT_SYSTEM_ID: AtomicU32 = AtomicU32::new(1);

/// Identifier of a type within one [`TypeSystem`].
///
/// The id remembers which type system issued it, so handing a type from one
/// type system to a store built on another is caught as a usage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId {
    system: u32,
    index: u32,
}

impl TypeId {
    /// Position of the type in declaration order (the root is 0).
    pub fn index(&self) -> usize {
        self.index as usize
    }

    /// Identity of the issuing type system.
    pub fn system(&self) -> u32 {
        self.system
    }
}

#[derive(Debug, Clone)]
struct TypeDecl {
    name: String,
    supertype: Option<u32>,
}

/// An immutable set of annotation types.
#[derive(Debug, Clone)]
pub struct TypeSystem {
    id: u32,
    types: Vec<TypeDecl>,
    by_name: HashMap<String, u32>,
    /// Per type: the type and all its descendants, in declaration order.
    subtypes: Vec<Vec<TypeId>>,
}

impl TypeSystem {
    pub fn builder() -> TypeSystemBuilder {
        TypeSystemBuilder::default()
    }

    /// Build a type system whose types all derive directly from the root.
    pub fn with_types(names: &[&str]) -> SelectResult<Self> {
        let mut builder = Self::builder();
        for name in names {
            builder = builder.add_type(*name);
        }
        builder.build()
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// The built-in root type.
    pub fn annotation_type(&self) -> TypeId {
        self.type_id(0)
    }

    /// Look up a type by name.
    pub fn type_named(&self, name: &str) -> SelectResult<TypeId> {
        self.by_name
            .get(name)
            .map(|&index| self.type_id(index))
            .ok_or_else(|| SelectError::UnknownType(name.to_string()))
    }

    /// # Panics
    /// Panics if `ty` was issued by another type system. Use
    /// [`TypeSystem::check`] first for ids of unknown origin.
    pub fn name(&self, ty: TypeId) -> &str {
        &self.decl(ty).name
    }

    /// # Panics
    /// Panics if `ty` was issued by another type system.
    pub fn supertype(&self, ty: TypeId) -> Option<TypeId> {
        self.decl(ty).supertype.map(|index| self.type_id(index))
    }

    /// True if `sub` is `sup` or one of its descendants.
    pub fn subsumes(&self, sup: TypeId, sub: TypeId) -> bool {
        let mut current = Some(sub);
        while let Some(ty) = current {
            if ty == sup {
                return true;
            }
            current = self.supertype(ty);
        }
        false
    }

    /// The type and all its descendants, in declaration order.
    ///
    /// # Panics
    /// Panics if `ty` was issued by another type system.
    pub fn subtypes(&self, ty: TypeId) -> &[TypeId] {
        self.decl(ty);
        &self.subtypes[ty.index()]
    }

    /// Number of types, including the root.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn types(&self) -> impl Iterator<Item = TypeId> + '_ {
        (0..self.types.len() as u32).map(move |index| self.type_id(index))
    }

    /// Reject type ids issued by another type system.
    pub fn check(&self, ty: TypeId) -> SelectResult<()> {
        if ty.system == self.id && ty.index() < self.types.len() {
            Ok(())
        } else {
            Err(SelectError::ForeignType {
                expected: self.id,
                found: ty.system,
            })
        }
    }

    fn decl(&self, ty: TypeId) -> &TypeDecl {
        assert_eq!(
            ty.system, self.id,
            "type id from type system {} used with type system {}",
            ty.system, self.id
        );
        &self.types[ty.index()]
    }

    fn type_id(&self, index: u32) -> TypeId {
        TypeId {
            system: self.id,
            index,
        }
    }
}

/// Collects type declarations; supertypes may be declared in any order.
#[derive(Debug, Default)]
pub struct TypeSystemBuilder {
    decls: Vec<(String, Option<String>)>,
}

impl TypeSystemBuilder {
    /// Declare a type deriving directly from the root type.
    pub fn add_type(mut self, name: impl Into<String>) -> Self {
        self.decls.push((name.into(), None));
        self
    }

    /// Declare a type deriving from `supertype`.
    pub fn add_subtype(mut self, name: impl Into<String>, supertype: impl Into<String>) -> Self {
        self.decls.push((name.into(), Some(supertype.into())));
        self
    }

    pub fn build(self) -> SelectResult<TypeSystem> {
        let mut types = vec![TypeDecl {
            name: ANNOTATION_TYPE_NAME.to_string(),
            supertype: None,
        }];
        let mut by_name = HashMap::new();
        by_name.insert(ANNOTATION_TYPE_NAME.to_string(), 0);

        for (name, _) in &self.decls {
            if by_name.contains_key(name) {
                return Err(SelectError::InvalidTypeSystem(format!(
                    "type '{}' declared twice",
                    name
                )));
            }
            by_name.insert(name.clone(), types.len() as u32);
            types.push(TypeDecl {
                name: name.clone(),
                supertype: Some(0),
            });
        }

        for (index, (name, supertype)) in self.decls.iter().enumerate() {
            if let Some(supertype) = supertype {
                let parent = *by_name.get(supertype).ok_or_else(|| {
                    SelectError::InvalidTypeSystem(format!(
                        "type '{}' extends unknown type '{}'",
                        name, supertype
                    ))
                })?;
                types[index + 1].supertype = Some(parent);
            }
        }

        // Every chain must reach the root.
        for (index, decl) in types.iter().enumerate() {
            let mut steps = 0;
            let mut current = decl.supertype;
            while let Some(parent) = current {
                steps += 1;
                if parent as usize == index || steps > types.len() {
                    return Err(SelectError::InvalidTypeSystem(format!(
                        "type '{}' inherits from itself",
                        decl.name
                    )));
                }
                current = types[parent as usize].supertype;
            }
        }

        let id = NEXT_SYSTEM_ID.fetch_add(1, Ordering::Relaxed);
        let mut subtypes = vec![Vec::new(); types.len()];
        for index in 0..types.len() {
            let mut current = Some(index as u32);
            while let Some(ancestor) = current {
                subtypes[ancestor as usize].push(TypeId {
                    system: id,
                    index: index as u32,
                });
                current = types[ancestor as usize].supertype;
            }
        }

        Ok(TypeSystem {
            id,
            types,
            by_name,
            subtypes,
        })
    }
}

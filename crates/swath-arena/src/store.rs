//! Realized stores: the compiled form of a schema.
//!
//! A [`Store`] mirrors its schema's shape. Groups stay groups; each
//! `Scalar` leaf becomes a [`ScalarBuffer`] in the flattened scalar list
//! and each `Array` leaf becomes an [`ArrayField`] placed in its type's
//! [`SharedBuffer`]. The tree itself only holds ids into those lists.
//!
//! Building is a pure transform: [`Store::build`] either returns a
//! complete store or an error, never a half-compiled one.

use indexmap::IndexMap;
use swath_core::{
    display_path, ArrayId, ConfigError, EntityId, FieldPath, PrimitiveType, ScalarId, SchemaNode,
    StoreHandle,
};
use tracing::{debug, trace};

use crate::column::{Column, Element};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::handle::{EntityView, Owned};
use crate::packer::{ArrayField, ArrayPacker, CursorTable, SharedBuffer};
use crate::shadow::{ShadowKind, Shadows};

/// Buffer for one `Scalar` leaf: one element per entity.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarBuffer {
    data: Column,
    shadows: Shadows,
    owner: StoreHandle,
}

impl ScalarBuffer {
    /// A zeroed buffer of `len` elements with shadows copied from it.
    pub(crate) fn new(ty: PrimitiveType, len: usize, owner: StoreHandle) -> Self {
        let data = Column::zeroed(ty, len);
        Self {
            shadows: Shadows::of(&data),
            data,
            owner,
        }
    }

    /// Grown copy: data and each shadow keep their own contents.
    pub(crate) fn resized(&self, len: usize) -> Self {
        Self {
            data: self.data.resized(len),
            shadows: self.shadows.resized(len),
            owner: self.owner,
        }
    }

    /// Element type.
    pub fn ty(&self) -> PrimitiveType {
        self.data.ty()
    }

    /// Number of entity slots.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer has no slots.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Live data.
    pub fn data(&self) -> &Column {
        &self.data
    }

    /// Mutable live data.
    pub fn data_mut(&mut self) -> &mut Column {
        &mut self.data
    }

    /// Typed view of every slot.
    pub fn as_slice<T: Element>(&self) -> Result<&[T], StoreError> {
        self.data.as_slice()
    }

    /// Typed mutable view of every slot.
    pub fn as_mut_slice<T: Element>(&mut self) -> Result<&mut [T], StoreError> {
        self.data.as_mut_slice()
    }

    /// Read one entity's value.
    pub fn get<T: Element>(&self, entity: EntityId) -> Result<T, StoreError> {
        let capacity = self.len();
        self.as_slice::<T>()?
            .get(entity.index())
            .copied()
            .ok_or(StoreError::EntityOutOfRange {
                entity,
                capacity: capacity as u32,
            })
    }

    /// Write one entity's value.
    pub fn set<T: Element>(&mut self, entity: EntityId, value: T) -> Result<(), StoreError> {
        let capacity = self.len();
        let slot = self
            .as_mut_slice::<T>()?
            .get_mut(entity.index())
            .ok_or(StoreError::EntityOutOfRange {
                entity,
                capacity: capacity as u32,
            })?;
        *slot = value;
        Ok(())
    }

    /// Both shadows.
    pub fn shadows(&self) -> &Shadows {
        &self.shadows
    }

    /// One shadow.
    pub fn shadow(&self, kind: ShadowKind) -> &Column {
        self.shadows.get(kind)
    }

    /// One shadow, mutably.
    pub fn shadow_mut(&mut self, kind: ShadowKind) -> &mut Column {
        self.shadows.get_mut(kind)
    }

    /// Size of data plus shadows in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.memory_bytes() + self.shadows.memory_bytes()
    }
}

impl Owned for ScalarBuffer {
    fn owner(&self) -> StoreHandle {
        self.owner
    }
}

/// One node of a store's tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreNode {
    /// Named children, in schema order.
    Group(IndexMap<String, StoreNode>),
    /// A scalar leaf.
    Scalar(ScalarId),
    /// An array leaf.
    Array(ArrayId),
}

impl StoreNode {
    /// Follow `path` down from this node.
    pub fn get(&self, path: &[&str]) -> Option<&StoreNode> {
        let mut node = self;
        for key in path {
            match node {
                Self::Group(children) => node = children.get(*key)?,
                _ => return None,
            }
        }
        Some(node)
    }
}

/// A compiled schema: every buffer for `capacity` entities.
#[derive(Clone, Debug)]
pub struct Store {
    handle: StoreHandle,
    /// Configured entity limit.
    capacity: u32,
    /// Entity count the buffers are actually sized for.
    allocated: u32,
    array_field_count: usize,
    root: StoreNode,
    scalars: Vec<ScalarBuffer>,
    arrays: Vec<ArrayField>,
    shared: IndexMap<PrimitiveType, SharedBuffer>,
    cursors: CursorTable,
}

impl Store {
    /// Compile `schema` into buffers for `capacity` entities.
    ///
    /// Fails with [`ConfigError`] if the capacity is zero, an `Array` leaf
    /// has no length, or a buffer size overflows. The schema is only
    /// read; nothing about it is retained.
    pub fn build(
        schema: &SchemaNode,
        capacity: u32,
        handle: StoreHandle,
    ) -> Result<Self, ConfigError> {
        StoreConfig::new(capacity).validate()?;
        schema.validate()?;

        let array_field_count = schema.array_field_count();
        let sizes = ArrayPacker::plan(
            schema.leaves().into_iter().filter_map(|(_, leaf)| match leaf {
                SchemaNode::Array { ty, length } => Some((*ty, *length)),
                _ => None,
            }),
            capacity,
        )?;

        let mut compiler = Compiler {
            handle,
            capacity,
            packer: ArrayPacker::new(handle, capacity),
            scalars: Vec::new(),
            arrays: Vec::new(),
        };
        let root = compiler.compile(schema, &mut FieldPath::new())?;

        let shared: IndexMap<PrimitiveType, SharedBuffer> = sizes
            .into_iter()
            .map(|(ty, len)| {
                trace!(%handle, %ty, len, "allocating shared array buffer");
                (ty, SharedBuffer::new(Column::zeroed(ty, len), 0))
            })
            .collect();

        debug!(
            %handle,
            capacity,
            scalars = compiler.scalars.len(),
            arrays = array_field_count,
            shared_buffers = shared.len(),
            "built store"
        );

        Ok(Self {
            handle,
            capacity,
            allocated: capacity,
            array_field_count,
            root,
            scalars: compiler.scalars,
            arrays: compiler.arrays,
            shared,
            cursors: compiler.packer.into_cursors(),
        })
    }

    /// Registry key of this store.
    pub fn handle(&self) -> StoreHandle {
        self.handle
    }

    /// Configured entity limit.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Entity count the buffers currently hold.
    ///
    /// Equal to [`Store::capacity`] unless the capacity was reconfigured
    /// without a resize.
    pub fn allocated_capacity(&self) -> u32 {
        self.allocated
    }

    /// Update the configured capacity without touching any buffer.
    pub(crate) fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
    }

    /// Number of `Array` leaves in the schema this store was built from.
    pub fn array_field_count(&self) -> usize {
        self.array_field_count
    }

    /// Root of the store tree.
    pub fn root(&self) -> &StoreNode {
        &self.root
    }

    /// Node at `path`.
    pub fn node(&self, path: &[&str]) -> Option<&StoreNode> {
        self.root.get(path)
    }

    /// Id of the scalar leaf at `path`.
    pub fn scalar_id(&self, path: &[&str]) -> Result<ScalarId, StoreError> {
        match self.node(path) {
            Some(StoreNode::Scalar(id)) => Ok(*id),
            _ => Err(no_such_field(path)),
        }
    }

    /// Scalar buffer at `path`.
    pub fn scalar(&self, path: &[&str]) -> Result<&ScalarBuffer, StoreError> {
        let id = self.scalar_id(path)?;
        Ok(&self.scalars[id.0 as usize])
    }

    /// Mutable scalar buffer at `path`.
    pub fn scalar_mut(&mut self, path: &[&str]) -> Result<&mut ScalarBuffer, StoreError> {
        let id = self.scalar_id(path)?;
        Ok(&mut self.scalars[id.0 as usize])
    }

    /// Mutable scalar buffer by id.
    pub fn scalar_by_id_mut(&mut self, id: ScalarId) -> Option<&mut ScalarBuffer> {
        self.scalars.get_mut(id.0 as usize)
    }

    /// Every scalar buffer, in compile order.
    pub fn scalars(&self) -> &[ScalarBuffer] {
        &self.scalars
    }

    /// Id of the array leaf at `path`.
    pub fn array_id(&self, path: &[&str]) -> Result<ArrayId, StoreError> {
        match self.node(path) {
            Some(StoreNode::Array(id)) => Ok(*id),
            _ => Err(no_such_field(path)),
        }
    }

    /// Placement of the array leaf at `path`.
    pub fn array(&self, path: &[&str]) -> Result<ArrayField, StoreError> {
        let id = self.array_id(path)?;
        Ok(self.arrays[id.0 as usize])
    }

    /// Every array field, in compile (and packing) order.
    pub fn arrays(&self) -> &[ArrayField] {
        &self.arrays
    }

    /// Shared buffer for `ty`, if any array field uses it.
    pub fn shared_buffer(&self, ty: PrimitiveType) -> Option<&SharedBuffer> {
        self.shared.get(&ty)
    }

    /// Mutable shared buffer for `ty`.
    pub fn shared_buffer_mut(&mut self, ty: PrimitiveType) -> Option<&mut SharedBuffer> {
        self.shared.get_mut(&ty)
    }

    /// Every shared buffer, in first-use order.
    pub fn shared_buffers(&self) -> impl Iterator<Item = (PrimitiveType, &SharedBuffer)> {
        self.shared.iter().map(|(ty, buffer)| (*ty, buffer))
    }

    /// Per-type cursor positions left by the last build or resize.
    pub fn cursors(&self) -> &CursorTable {
        &self.cursors
    }

    /// Derive `entity`'s view of `field`.
    ///
    /// `field` must come from this store's current generation: a placement
    /// kept across a resize fails with [`StoreError::StaleView`].
    pub fn entity_view(&self, field: ArrayField, entity: EntityId) -> Result<EntityView, StoreError> {
        let generation = self.check_placement(&field)?;
        if entity.0 >= self.allocated {
            return Err(StoreError::EntityOutOfRange {
                entity,
                capacity: self.allocated,
            });
        }
        Ok(field_view(self.handle, &field, generation, entity))
    }

    /// Views of `field` for every entity `0..allocated_capacity`.
    ///
    /// Fails like [`Store::entity_view`] for a foreign or stale `field`.
    pub fn views(
        &self,
        field: ArrayField,
    ) -> Result<impl Iterator<Item = EntityView> + '_, StoreError> {
        let generation = self.check_placement(&field)?;
        let owner = self.handle;
        Ok((0..self.allocated).map(move |e| field_view(owner, &field, generation, EntityId(e))))
    }

    /// Live slots behind `view`.
    pub fn view_data<T: Element>(&self, view: &EntityView) -> Result<&[T], StoreError> {
        self.resolve(view)?.data().range(view.range())
    }

    /// Mutable live slots behind `view`.
    pub fn view_data_mut<T: Element>(&mut self, view: &EntityView) -> Result<&mut [T], StoreError> {
        self.resolve_mut(view)?.data_mut().range_mut(view.range())
    }

    /// Shadow slots behind `view`, at the same offsets as the live data.
    pub fn view_shadow<T: Element>(
        &self,
        view: &EntityView,
        kind: ShadowKind,
    ) -> Result<&[T], StoreError> {
        self.resolve(view)?.shadow(kind).range(view.range())
    }

    /// Mutable shadow slots behind `view`.
    pub fn view_shadow_mut<T: Element>(
        &mut self,
        view: &EntityView,
        kind: ShadowKind,
    ) -> Result<&mut [T], StoreError> {
        self.resolve_mut(view)?.shadow_mut(kind).range_mut(view.range())
    }

    /// `entity`'s slots of the array leaf at `path`.
    pub fn entity_data<T: Element>(&self, path: &[&str], entity: EntityId) -> Result<&[T], StoreError> {
        let view = self.entity_view(self.array(path)?, entity)?;
        self.view_data(&view)
    }

    /// Mutable `entity`'s slots of the array leaf at `path`.
    pub fn entity_data_mut<T: Element>(
        &mut self,
        path: &[&str],
        entity: EntityId,
    ) -> Result<&mut [T], StoreError> {
        let view = self.entity_view(self.array(path)?, entity)?;
        self.view_data_mut(&view)
    }

    /// Zero every scalar and shared buffer in place.
    ///
    /// Shadows, capacity, and all offsets are left as they are.
    pub fn reset(&mut self) {
        for scalar in &mut self.scalars {
            scalar.data_mut().fill_zero();
        }
        for buffer in self.shared.values_mut() {
            buffer.data_mut().fill_zero();
        }
        debug!(handle = %self.handle, "reset store");
    }

    /// Size of every buffer and shadow in bytes.
    pub fn memory_bytes(&self) -> usize {
        let scalars: usize = self.scalars.iter().map(ScalarBuffer::memory_bytes).sum();
        let shared: usize = self.shared.values().map(SharedBuffer::memory_bytes).sum();
        scalars + shared
    }

    fn shared_for(&self, ty: PrimitiveType) -> Result<&SharedBuffer, StoreError> {
        self.shared.get(&ty).ok_or_else(|| StoreError::NoSuchField {
            path: format!("<{ty} shared buffer>"),
        })
    }

    fn resolve(&self, view: &EntityView) -> Result<&SharedBuffer, StoreError> {
        self.check_owner(view)?;
        let buffer = self.shared_for(view.ty)?;
        check_generation(view, buffer)?;
        Ok(buffer)
    }

    fn resolve_mut(&mut self, view: &EntityView) -> Result<&mut SharedBuffer, StoreError> {
        self.check_owner(view)?;
        let ty = view.ty;
        let buffer = self
            .shared
            .get_mut(&ty)
            .ok_or_else(|| StoreError::NoSuchField {
                path: format!("<{ty} shared buffer>"),
            })?;
        check_generation(view, buffer)?;
        Ok(buffer)
    }

    /// Generation of `field`'s buffer, if `field` is current for this store.
    fn check_placement(&self, field: &ArrayField) -> Result<u32, StoreError> {
        if field.owner != self.handle {
            return Err(StoreError::ForeignView {
                view_owner: field.owner,
                store: self.handle,
            });
        }
        let current = self.shared_for(field.ty)?.generation();
        if field.generation != current {
            return Err(StoreError::StaleView {
                view_generation: field.generation,
                current_generation: current,
            });
        }
        Ok(current)
    }

    fn check_owner(&self, view: &EntityView) -> Result<(), StoreError> {
        if view.owner != self.handle {
            return Err(StoreError::ForeignView {
                view_owner: view.owner,
                store: self.handle,
            });
        }
        Ok(())
    }

    /// Swap in buffers produced by a resize pass.
    pub(crate) fn install(
        &mut self,
        capacity: u32,
        scalars: Vec<ScalarBuffer>,
        arrays: Vec<ArrayField>,
        shared: IndexMap<PrimitiveType, SharedBuffer>,
        cursors: CursorTable,
    ) {
        self.capacity = capacity;
        self.allocated = capacity;
        self.scalars = scalars;
        self.arrays = arrays;
        self.shared = shared;
        self.cursors = cursors;
    }
}

impl Owned for Store {
    fn owner(&self) -> StoreHandle {
        self.handle
    }
}

fn field_view(owner: StoreHandle, field: &ArrayField, generation: u32, entity: EntityId) -> EntityView {
    EntityView {
        owner,
        ty: field.ty,
        generation,
        offset: field.span(entity).start,
        len: field.length,
        entity,
        index_width: field.index_width,
    }
}

fn check_generation(view: &EntityView, buffer: &SharedBuffer) -> Result<(), StoreError> {
    if view.generation != buffer.generation() {
        return Err(StoreError::StaleView {
            view_generation: view.generation,
            current_generation: buffer.generation(),
        });
    }
    Ok(())
}

fn no_such_field(path: &[&str]) -> StoreError {
    let owned: Vec<String> = path.iter().map(|s| s.to_string()).collect();
    StoreError::NoSuchField {
        path: display_path(&owned),
    }
}

/// Single walk over the schema, accumulating leaves into flat lists.
struct Compiler {
    handle: StoreHandle,
    capacity: u32,
    packer: ArrayPacker,
    scalars: Vec<ScalarBuffer>,
    arrays: Vec<ArrayField>,
}

impl Compiler {
    fn compile(&mut self, node: &SchemaNode, path: &mut FieldPath) -> Result<StoreNode, ConfigError> {
        match node {
            SchemaNode::Group(children) => {
                let mut out = IndexMap::with_capacity(children.len());
                for (name, child) in children {
                    path.push(name.clone());
                    let compiled = self.compile(child, path)?;
                    path.pop();
                    out.insert(name.clone(), compiled);
                }
                Ok(StoreNode::Group(out))
            }
            SchemaNode::Scalar(ty) => {
                let id = ScalarId(self.scalars.len() as u32);
                self.scalars
                    .push(ScalarBuffer::new(*ty, self.capacity as usize, self.handle));
                Ok(StoreNode::Scalar(id))
            }
            SchemaNode::Array { ty, length } => {
                let field = self.packer.pack(*ty, *length, &path[..])?;
                let id = ArrayId(self.arrays.len() as u32);
                self.arrays.push(field);
                Ok(StoreNode::Array(id))
            }
        }
    }
}

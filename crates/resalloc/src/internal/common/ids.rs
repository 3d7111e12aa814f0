use crate::define_id_type;

// Identifier of a job, supplied by the caller.
define_id_type!(JobId, u64);

// Unique id of a resource vertex as written in the graph description.
define_id_type!(VertexId, u64);

// Position of a vertex inside the graph arena.
define_id_type!(VertexIdx, u32);

// Interned name of a resource type (node, core, gpu, ...).
define_id_type!(ResourceTypeId, u32);

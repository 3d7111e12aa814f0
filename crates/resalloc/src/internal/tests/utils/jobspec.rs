use serde_json::{Value, json};

#[derive(Default)]
pub struct JobspecBuilder {
    resources: Vec<Value>,
    duration: Option<u64>,
}

impl JobspecBuilder {
    pub fn resource(mut self, resource_type: &str, count: u64) -> JobspecBuilder {
        self.resources
            .push(json!({"type": resource_type, "count": count}));
        self
    }

    pub fn cores(self, count: u64) -> JobspecBuilder {
        self.resource("core", count)
    }

    pub fn nodes(self, count: u64) -> JobspecBuilder {
        self.resource("node", count)
    }

    pub fn exclusive_nodes(mut self, count: u64) -> JobspecBuilder {
        self.resources
            .push(json!({"type": "node", "count": count, "exclusive": true}));
        self
    }

    /// `nodes` x node, each with `cores` cores
    pub fn node_cores(mut self, nodes: u64, cores: u64) -> JobspecBuilder {
        self.resources.push(json!({
            "type": "node",
            "count": nodes,
            "with": [{"type": "core", "count": cores}]
        }));
        self
    }

    /// `nodes` x node, each with `slots` task slots holding the given resources
    pub fn node_slot(mut self, nodes: u64, slots: u64, content: &[(&str, u64)]) -> JobspecBuilder {
        let with: Vec<Value> = content
            .iter()
            .map(|(t, count)| json!({"type": t, "count": count}))
            .collect();
        self.resources.push(json!({
            "type": "node",
            "count": nodes,
            "with": [{"type": "slot", "count": slots, "label": "task", "with": with}]
        }));
        self
    }

    pub fn duration(mut self, seconds: u64) -> JobspecBuilder {
        self.duration = Some(seconds);
        self
    }

    pub fn build(&self) -> String {
        let mut jobspec = json!({
            "version": 1,
            "resources": self.resources,
            "tasks": [{"command": ["app"], "slot": "task", "count": {"per_slot": 1}}],
        });
        if let Some(duration) = self.duration {
            jobspec["attributes"] = json!({"system": {"duration": duration}});
        }
        jobspec.to_string()
    }
}

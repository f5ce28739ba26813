//! Executes core requests over HTTP with ureq.

use users_core::{ApiError, Effect, HttpMethod, HttpRequest, HttpResponse, ListController, Outcome};

pub struct Transport {
    agent: ureq::Agent,
}

impl Transport {
    pub fn new() -> Self {
        // Error statuses are data for the core to interpret, not transport errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn execute(&self, req: HttpRequest) -> Outcome {
        tracing::debug!(method = req.method.as_str(), path = %req.path, "request");
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => self.agent.get(&req.path).call(),
            (HttpMethod::Delete, _) => self.agent.delete(&req.path).call(),
            (HttpMethod::Post, Some(body)) => self
                .agent
                .post(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => self.agent.post(&req.path).send_empty(),
            (HttpMethod::Put, Some(body)) => self
                .agent
                .put(&req.path)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => self.agent.put(&req.path).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        tracing::debug!(status, bytes = body.len(), "response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    /// Execute an effect and every follow-up request the controller asks for.
    pub fn drive(&self, controller: &mut ListController, effect: Effect) {
        let mut next = Some(effect);
        while let Some(effect) = next {
            next = controller.complete(effect.ticket, self.execute(effect.request));
        }
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new()
    }
}

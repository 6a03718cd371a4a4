//! Sequential request chains.

use bytes::Bytes;

use crate::error::RequestError;

use super::Request;

/// A step factory: builds the next request from every prior step's raw
/// response and error, indexed by step with `None` placeholders for the
/// kind that step did not produce.
pub type ChainStep =
    Box<dyn Fn(&[Option<Bytes>], &[Option<RequestError>]) -> Request + Send + Sync>;

/// Chains multiple requests together, run strictly in order.
///
/// Each step factory receives the accumulated responses and errors of all
/// previous steps and returns the request to run next; step `i + 1` is not
/// dispatched until step `i`'s outcome is known. A failing step does not
/// abort the chain - it contributes a `None` response and a `Some` error,
/// and the chain continues. To run requests in parallel instead, see
/// [`RequestGroup`](super::RequestGroup).
///
/// ```no_run
/// use declareq_client::param::Param;
/// use declareq_client::request::{Request, RequestChain};
/// use declareq_client::json::Json;
///
/// RequestChain::new()
///     .step(|_, _| Request::new([Param::url("https://api.example.com/todos")]))
///     .step(|responses, _| {
///         let todos = Json::from_bytes(responses[0].as_ref().unwrap()).unwrap();
///         let id = todos.get(0).unwrap().get("id").unwrap().int();
///         Request::new([Param::url(&format!("https://api.example.com/todos/{id}"))])
///     })
///     .call(|responses, errors| {
///         println!("{} steps, {} errors", responses.len(),
///             errors.iter().flatten().count());
///     });
/// ```
#[derive(Default)]
pub struct RequestChain {
    steps: Vec<ChainStep>,
}

impl RequestChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        RequestChain { steps: Vec::new() }
    }

    /// Append a step factory.
    #[must_use]
    pub fn step(
        mut self,
        factory: impl Fn(&[Option<Bytes>], &[Option<RequestError>]) -> Request
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.steps.push(Box::new(factory));
        self
    }

    /// Run the chain to completion, returning the accumulated responses
    /// and errors - one entry per step, in step order.
    ///
    /// Callbacks registered on the step requests themselves are not
    /// invoked; the chain observes each outcome directly.
    pub async fn run(&self) -> (Vec<Option<Bytes>>, Vec<Option<RequestError>>) {
        let mut responses: Vec<Option<Bytes>> = Vec::with_capacity(self.steps.len());
        let mut errors: Vec<Option<RequestError>> = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            let request = step(&responses, &errors);
            match request.outcome().await {
                Ok(response) => {
                    responses.push(Some(response.body));
                    errors.push(None);
                }
                Err(error) => {
                    log::debug!("chain step {} failed: {error}; continuing", responses.len());
                    responses.push(None);
                    errors.push(Some(error));
                }
            }
        }

        (responses, errors)
    }

    /// Run the chain fire-and-forget, delivering the accumulated lists to
    /// a terminal callback when the last step completes.
    pub fn call(
        self,
        terminal: impl FnOnce(Vec<Option<Bytes>>, Vec<Option<RequestError>>) + Send + 'static,
    ) {
        tokio::spawn(async move {
            let (responses, errors) = self.run().await;
            terminal(responses, errors);
        });
    }
}

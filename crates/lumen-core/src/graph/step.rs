use std::future::Future;

use super::GraphError;

/// One node of the graph: consumes a value and produces the next.
pub trait Step: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn run(&self, input: Self::Input)
    -> impl Future<Output = Result<Self::Output, GraphError>> + Send;

    /// Wire `next` after this node.
    fn then<N>(self, next: N) -> Then<Self, N>
    where
        Self: Sized,
        N: Step<Input = Self::Output>,
    {
        Then { first: self, next }
    }
}

/// Directed edge `first -> next`; the input/output types must line up, so a
/// node can only ever see what its predecessor produced.
pub struct Then<A, B> {
    first: A,
    next: B,
}

impl<A, B> Step for Then<A, B>
where
    A: Step,
    B: Step<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    async fn run(&self, input: Self::Input) -> Result<Self::Output, GraphError> {
        let intermediate = self.first.run(input).await?;
        self.next.run(intermediate).await
    }
}

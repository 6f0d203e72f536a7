use crate::errors::Result;

pub enum FlowCtrl {
    Continue,
    Finish,
    Abort,
}

pub trait Flow {
    fn render(&mut self) -> Result<()>;
    fn handle_input(&mut self, input: &str) -> Result<FlowCtrl>;
}

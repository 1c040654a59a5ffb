/// Default Gemini model for delivery verification.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// MIME type requested for the structured response.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Fixed instruction sent after the image parts.
///
/// The raised-tub rule lives only here: the model is told a tilted or upright
/// tub proves the vehicle is empty. Nothing in this crate checks it.
pub const DELIVERY_INSTRUCTION: &str = "\
You are an AI assistant for a logistics company. Your task is to analyze the provided set of images for a single goods delivery and verify if they meet all the required criteria.
Based on the images, evaluate each of the following conditions and provide a boolean response according to the provided schema.

A critical rule for the 'vehicleEmpty' property: A photo of the truck's tub/dumper in a fully upright or tilted position is SUFFICIENT PROOF that the vehicle has been completely unloaded and is now empty. You do not need to see the inside of the tub if it's raised.

Also provide a brief summary of your findings.";

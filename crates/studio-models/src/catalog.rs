//! The built-in model catalog.

use crate::spec::{FieldSpec, InputFields, ModelDescriptor, OutputKind};

/// Every model shipped with studio, in display order.
pub fn builtin() -> Vec<ModelDescriptor> {
    vec![sdxl(), anything_v3(), dreamshaper(), lcm_sdxl()]
}

fn image_model(
    id: &str,
    name: &str,
    description: &str,
    owner: &str,
    model: &str,
    version: &str,
    inputs: InputFields,
) -> ModelDescriptor {
    ModelDescriptor {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        owner: owner.into(),
        model_name: model.into(),
        version: Some(version.into()),
        inputs,
        output_kind: OutputKind::Image,
    }
}

fn sdxl() -> ModelDescriptor {
    image_model(
        "sdxl",
        "Stable Diffusion XL",
        "High-resolution text-to-image generation with Stable Diffusion XL",
        "stability-ai",
        "sdxl",
        "7762fd07cf82c948538e41f63f77d685e02b063e37e496e96eefd46c929f9bdc",
        InputFields::from_iter([
            ("prompt", FieldSpec::string(None).required()),
            ("width", FieldSpec::integer(Some(768), Some((512, 1024)))),
            ("height", FieldSpec::integer(Some(768), Some((512, 1024)))),
            ("num_outputs", FieldSpec::integer(Some(1), Some((1, 4)))),
            ("guidance_scale", FieldSpec::float(Some(7.5), None)),
            ("num_inference_steps", FieldSpec::integer(Some(25), None)),
            (
                "refine",
                FieldSpec::choice(
                    "expert_ensemble_refiner",
                    &["no_refiner", "expert_ensemble_refiner", "base_image_refiner"],
                ),
            ),
            ("scheduler", FieldSpec::string(Some("K_EULER"))),
            ("lora_scale", FieldSpec::float(Some(0.6), Some((0.0, 1.0)))),
            ("apply_watermark", FieldSpec::choice("false", &["true", "false"])),
            ("high_noise_frac", FieldSpec::float(Some(0.8), Some((0.0, 1.0)))),
            ("negative_prompt", FieldSpec::string(Some(""))),
            ("prompt_strength", FieldSpec::float(Some(0.8), Some((0.0, 1.0)))),
        ]),
    )
}

fn anything_v3() -> ModelDescriptor {
    image_model(
        "anything-v3",
        "Anything V3 (Anime)",
        "Anime-style image generator fine-tuned from Stable Diffusion",
        "cjwbw",
        "anything-v3.0",
        "f410ed4c6a0c3bf8b76747860b3a3c9e4c8b5a827a16eac9dd5ad9642edce9a2",
        InputFields::from_iter([
            ("prompt", FieldSpec::string(None).required()),
            ("width", FieldSpec::integer(Some(512), None)),
            ("height", FieldSpec::integer(Some(512), None)),
            ("num_outputs", FieldSpec::integer(Some(1), Some((1, 4)))),
            ("guidance_scale", FieldSpec::float(Some(12.0), None)),
            ("num_inference_steps", FieldSpec::integer(Some(50), None)),
        ]),
    )
}

fn dreamshaper() -> ModelDescriptor {
    image_model(
        "dreamshaper",
        "DreamShaper",
        "General-purpose image generator supporting stylized output",
        "cjwbw",
        "dreamshaper",
        "ed6d8bee9a278b0d7125872bddfb9dd3fc4c401426ad634d8246a660e387475b",
        InputFields::from_iter([
            ("prompt", FieldSpec::string(None).required()),
            ("negative_prompt", FieldSpec::string(Some(""))),
            ("width", FieldSpec::integer(Some(512), None)),
            ("height", FieldSpec::integer(Some(768), None)),
            ("scheduler", FieldSpec::string(Some("K_EULER_ANCESTRAL"))),
            ("num_outputs", FieldSpec::integer(Some(1), Some((1, 4)))),
            ("guidance_scale", FieldSpec::float(Some(7.5), None)),
            ("num_inference_steps", FieldSpec::integer(Some(50), None)),
        ]),
    )
}

fn lcm_sdxl() -> ModelDescriptor {
    image_model(
        "lcm-sdxl",
        "LCM SDXL (Fast)",
        "Fast SDXL generation with a Latent Consistency Model",
        "dhanushreddy291",
        "lcm-sdxl",
        "5998ad9525e76b3cbb51798800d6f31353d8b726cb2af928a062cc8ade79465f",
        InputFields::from_iter([
            ("prompt", FieldSpec::string(None).required()),
            (
                "negative_prompt",
                FieldSpec::string(Some("3d, cgi, render, bad quality, normal quality")),
            ),
            ("num_outputs", FieldSpec::integer(Some(1), Some((1, 4)))),
            ("num_inference_steps", FieldSpec::integer(Some(7), Some((1, 50)))),
        ]),
    )
}

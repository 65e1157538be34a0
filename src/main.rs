mod cli;

use clap::Parser;
use log::{error, info};
use num_complex::Complex64;
use pmath::vector::Vec3;
use simple_error::SimpleResult;

use refractor::config::TraceSettings;
use refractor::grin::{IsotropicMedium, LuneburgIndex};
use refractor::light::{AmbientLight, LightSourceContainer, PointLight};
use refractor::logger::init_logger;
use refractor::ray::Ray;
use refractor::scene::{Plane, Scene, SceneBuilder, SceneObjectContainer, Sphere};
use refractor::spectrum::Color;
use refractor::surface::voxel::{ColouredBoundaries, PlaneFamily};
use refractor::surface::{
    FresnelRefractive, GradedIndexVolume, Metarefraction, Reflective, SurfaceColour, Tiled,
    VoxellatedVolume,
};

use cli::Args;

use std::error::Error;
use std::process;

// A checkerboard floor, a mirror ball, a glass ball, a Luneburg lens, a ball cut into
// tinted voxels and a ray-rotating window in front of it all.
fn demo_scene(settings: &TraceSettings) -> Result<SceneObjectContainer, Box<dyn Error>> {
    let mut builder = SceneBuilder::from_settings(settings).background(Color::new(0.6, 0.8, 1.));

    let checkerboard = Tiled::new(
        1.,
        1.,
        SurfaceColour::matte(Color::grey(0.9)),
        SurfaceColour::matte(Color::grey(0.1)),
    )?;
    builder.add(
        Plane::new("floor", Vec3::new(0., 0., -1.), Vec3::new(0., 0., 1.), checkerboard)
            .with_parameterisation(Vec3::new(1., 0., 0.), Vec3::new(0., 1., 0.)),
    )?;
    builder.add(Sphere::new(
        "mirror ball",
        Vec3::new(-2.5, 0., 0.),
        0.8,
        Reflective::new(0.9)?,
    ))?;
    builder.add(Sphere::new(
        "glass ball",
        Vec3::new(0., 0., 0.),
        1.,
        FresnelRefractive::new(1., 1.5, 1.)?,
    ))?;

    let lens = IsotropicMedium::new(LuneburgIndex {
        centre: Vec3::new(2.5, 0., 0.),
        radius: 1.,
    });
    builder.add(Sphere::new(
        "luneburg lens",
        Vec3::new(2.5, 0., 0.),
        1.,
        GradedIndexVolume::new(lens, &settings.grin)?,
    ))?;

    let voxels = VoxellatedVolume::new(ColouredBoundaries {
        colour: Color::new(0.05, 0., 0.02),
        transmission: 0.9,
    })
    .with_settings(&settings.voxel)
    .add_family(PlaneFamily::new(Vec3::new(1., 0., 0.), 0.25, 0.)?)?
    .add_family(PlaneFamily::new(Vec3::new(0., 1., 0.), 0.25, 0.)?)?
    .add_family(PlaneFamily::new(Vec3::new(0., 0., 1.), 0.25, 0.)?)?;
    builder.add(Sphere::new("voxel ball", Vec3::new(0., 4., 0.5), 1.5, voxels))?;

    let window = Metarefraction::complex(Complex64::from_polar(0.9, 0.3), 0.95)?;
    builder.add(
        Plane::new("window", Vec3::new(0., -3., 0.), Vec3::new(0., -1., 0.), window)
            .with_parameterisation(Vec3::new(1., 0., 0.), Vec3::new(0., 0., 1.)),
    )?;

    Ok(builder.build())
}

fn load_settings(args: &Args) -> SimpleResult<TraceSettings> {
    match &args.settings {
        Some(path) => TraceSettings::from_path(path),
        None => Ok(TraceSettings::default()),
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let settings = load_settings(args)?;
    info!("settings: {:?}", settings);

    let scene = demo_scene(&settings)?;
    let light = LightSourceContainer::new()
        .add(AmbientLight::new(Color::grey(0.2)))
        .add(PointLight::new(Vec3::new(-3., -6., 6.), Color::white()).with_shininess(40.));

    let eye = Vec3::new(0., -8., 0.5);
    let n = args.rays.max(1);
    for i in 0..n {
        let s = if n == 1 { 0. } else { 2. * i as f64 / (n - 1) as f64 - 1. };
        let dir = Vec3::new(0.45 * s, 1., -0.05);
        let ray = if args.report && i == n / 2 {
            Ray::new_reporting(eye, dir, 0.)
        } else {
            Ray::new(eye, dir, 0.)
        };

        let c = scene.trace(&ray, None, &light, settings.budget())?;
        println!(
            "{:>3} dir=({:+.3}, {:+.3}, {:+.3}) colour=({:.4}, {:.4}, {:.4})",
            i, dir.x, dir.y, dir.z, c.r, c.g, c.b
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logger(args.log_level.clone().into());

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}
